//! KeyValueStore trait 定义

use async_trait::async_trait;
use errors::AppResult;
use std::time::Duration;

/// 键值存储 trait
///
/// 每个操作各自原子执行，不提供跨键事务
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 获取值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置值，`ttl` 为 `None` 时永不过期
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除键
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 原子性地批量获取，结果与 `keys` 一一对应
    async fn mget(&self, keys: &[String]) -> AppResult<Vec<Option<String>>>;

    /// 剩余存活时间（秒），键不存在或没有过期时间时返回 `None`
    async fn ttl(&self, key: &str) -> AppResult<Option<i64>>;

    /// 向集合添加成员
    async fn sadd(&self, key: &str, member: &str) -> AppResult<()>;

    /// 从集合移除成员
    async fn srem(&self, key: &str, member: &str) -> AppResult<()>;

    /// 获取集合全部成员（无序）
    async fn smembers(&self, key: &str) -> AppResult<Vec<String>>;
}
