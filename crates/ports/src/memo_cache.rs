//! MemoCache trait 定义

use async_trait::async_trait;
use errors::AppResult;
use futures::future::BoxFuture;

/// 按参数记忆化的缓存 trait
///
/// 未命中时执行 `populate` 并写入结果，填充失败不会写入缓存
#[async_trait]
pub trait MemoCache<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// 读取缓存，未命中时填充
    async fn get_or_populate<'a>(
        &'a self,
        key: K,
        populate: BoxFuture<'a, AppResult<V>>,
    ) -> AppResult<V>;

    /// 使指定条目失效
    async fn invalidate(&self, key: &K);
}
