//! ports - 抽象 trait 层
//!
//! 定义存储、缓存以及外部协作实体的抽象接口

mod collaborators;
mod key_value;
mod memo_cache;

pub use collaborators::*;
pub use key_value::*;
pub use memo_cache::*;
