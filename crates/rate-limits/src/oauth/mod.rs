//! OAuth access token 关联
//!
//! 主键保存 token → 应用 ID，可带过期时间；每个应用另有一个 token 集合作为索引。
//! 索引只保证“每个存活的 token 都在集合里”，反方向不保证：
//! 过期或被删除的 token 可能仍留在集合中，由读取路径发现后移除。

mod storage;
mod token;

pub use storage::*;
pub use token::*;
