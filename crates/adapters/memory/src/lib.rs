//! adapter-memory - 进程内适配器
//!
//! - `MemoryStore`：带过期语义的内存键值存储，用于测试和单机嵌入
//! - `MokaMemoCache`：基于 Moka 的记忆化缓存

mod memo_cache;
mod store;

pub use memo_cache::*;
pub use store::*;
