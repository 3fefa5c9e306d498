//! 测试替身

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use adapter_memory::{MemoCacheConfig, MemoryStore, MokaMemoCache};
use async_trait::async_trait;
use common::{MetricId, ServiceId};
use errors::AppResult;
use parking_lot::Mutex;
use ports::{KeyValueStore, MetricCatalog, ServiceVersions};

use crate::usage_limit::UsageLimitCache;

/// 统计批量读取和集合移除次数的内存存储
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    mget_calls: AtomicUsize,
    srem_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mget_calls(&self) -> usize {
        self.mget_calls.load(Ordering::SeqCst)
    }

    pub fn srem_calls(&self) -> usize {
        self.srem_calls.load(Ordering::SeqCst)
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    pub async fn members(&self, key: &str) -> Vec<String> {
        let mut members = self.inner.smembers(key).await.unwrap();
        members.sort();
        members
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn mget(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        self.mget_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.mget(keys).await
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
        self.inner.ttl(key).await
    }

    async fn sadd(&self, key: &str, member: &str) -> AppResult<()> {
        self.inner.sadd(key, member).await
    }

    async fn srem(&self, key: &str, member: &str) -> AppResult<()> {
        self.srem_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.srem(key, member).await
    }

    async fn smembers(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.smembers(key).await
    }
}

/// 固定指标列表，名称为首字母大写的 ID
pub struct StaticMetricCatalog {
    service_id: ServiceId,
    metric_ids: Vec<MetricId>,
    load_calls: AtomicUsize,
}

impl StaticMetricCatalog {
    pub fn new(service_id: &str, metric_ids: &[&str]) -> Self {
        Self {
            service_id: ServiceId::from(service_id),
            metric_ids: metric_ids.iter().map(|id| MetricId::from(*id)).collect(),
            load_calls: AtomicUsize::new(0),
        }
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricCatalog for StaticMetricCatalog {
    async fn load_all_ids(&self, service_id: &ServiceId) -> AppResult<Vec<MetricId>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if *service_id == self.service_id {
            Ok(self.metric_ids.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn load_name(
        &self,
        service_id: &ServiceId,
        metric_id: &MetricId,
    ) -> AppResult<Option<String>> {
        if *service_id != self.service_id || !self.metric_ids.contains(metric_id) {
            return Ok(None);
        }
        let mut chars = metric_id.as_str().chars();
        Ok(chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect()))
    }
}

/// 按服务记录版本号
#[derive(Default)]
pub struct VersionCounter {
    versions: Mutex<HashMap<ServiceId, u64>>,
}

impl VersionCounter {
    pub fn get(&self, service_id: &str) -> u64 {
        self.versions
            .lock()
            .get(&ServiceId::from(service_id))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ServiceVersions for VersionCounter {
    async fn incr_version(&self, service_id: &ServiceId) -> AppResult<()> {
        *self.versions.lock().entry(service_id.clone()).or_default() += 1;
        Ok(())
    }
}

pub fn memo_cache() -> UsageLimitCache {
    Arc::new(MokaMemoCache::new(MemoCacheConfig::default()))
}
