//! bootstrap - 启动骨架
//!
//! 加载配置后初始化日志、连接 Redis，并组装限流子系统的存储组件

mod infrastructure;
mod retry;
mod runtime;
mod stores;

pub use infrastructure::*;
pub use retry::*;
pub use runtime::*;
pub use stores::*;
