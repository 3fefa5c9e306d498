//! 基于 Moka 的记忆化缓存

use std::hash::Hash;
use std::time::Duration;

use async_trait::async_trait;
use errors::AppResult;
use futures::future::BoxFuture;
use moka::future::Cache as MokaCache;
use ports::MemoCache;

/// 记忆化缓存配置
#[derive(Debug, Clone)]
pub struct MemoCacheConfig {
    /// 最大条目数
    pub max_capacity: u64,
    /// 条目存活时间，`None` 表示只靠显式失效
    pub ttl: Option<Duration>,
}

impl Default for MemoCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: None,
        }
    }
}

/// Moka 记忆化缓存
///
/// 同一个键的并发填充只会执行一次，其余调用方等待同一个结果
#[derive(Clone)]
pub struct MokaMemoCache<K, V> {
    cache: MokaCache<K, V>,
}

impl<K, V> MokaMemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: MemoCacheConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }
}

#[async_trait]
impl<K, V> MemoCache<K, V> for MokaMemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get_or_populate<'a>(
        &'a self,
        key: K,
        populate: BoxFuture<'a, AppResult<V>>,
    ) -> AppResult<V> {
        self.cache
            .try_get_with(key, populate)
            .await
            .map_err(|e| (*e).clone())
    }

    async fn invalidate(&self, key: &K) {
        self.cache.invalidate(key).await;
    }
}
