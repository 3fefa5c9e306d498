//! rate-limits - 限流子系统核心
//!
//! - `oauth`：OAuth access token 与应用的关联及其过期管理
//! - `usage_limit`：按计费方案配置的用量限额
//! - `keys`：领域标识到存储键的映射
//!
//! 两部分共用同一个 `KeyValueStore`，不做跨键事务：
//! 二级索引允许出现过期引用，在读取时惰性修复。

pub mod error;
pub mod keys;
pub mod oauth;
pub mod usage_limit;

#[cfg(test)]
mod testing;

pub use error::*;
pub use oauth::*;
pub use usage_limit::*;
