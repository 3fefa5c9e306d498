//! 限流子系统存储组件装配

use std::sync::Arc;
use std::time::Duration;

use adapter_memory::{MemoCacheConfig, MokaMemoCache};
use config::UsageLimitCacheConfig;
use ports::{KeyValueStore, MetricCatalog, ServiceVersions};
use rate_limits::{TokenAssociationStore, UsageLimitCache, UsageLimitRegistry};

use crate::infrastructure::Infrastructure;

/// 共用同一个键值存储的 token 关联与用量限额
#[derive(Clone)]
pub struct RateLimitStores {
    pub tokens: TokenAssociationStore,
    pub usage_limits: UsageLimitRegistry,
}

impl RateLimitStores {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cache_config: &UsageLimitCacheConfig,
        metrics: Arc<dyn MetricCatalog>,
        services: Arc<dyn ServiceVersions>,
    ) -> Self {
        let cache: UsageLimitCache = Arc::new(MokaMemoCache::new(MemoCacheConfig {
            max_capacity: cache_config.max_capacity,
            ttl: cache_config.ttl_secs.map(Duration::from_secs),
        }));

        Self {
            tokens: TokenAssociationStore::new(store.clone()),
            usage_limits: UsageLimitRegistry::new(store, metrics, services, cache),
        }
    }

    /// 使用基础设施中的 Redis 存储和缓存配置
    pub fn from_infrastructure(
        infra: &Infrastructure,
        metrics: Arc<dyn MetricCatalog>,
        services: Arc<dyn ServiceVersions>,
    ) -> Self {
        Self::new(
            infra.store(),
            &infra.config().usage_limit_cache,
            metrics,
            services,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapter_memory::MemoryStore;
    use async_trait::async_trait;
    use common::{ApplicationId, MetricId, PlanId, ServiceId};
    use errors::AppResult;
    use rate_limits::{Period, UsageLimitAttributes};

    struct OneMetric;

    #[async_trait]
    impl MetricCatalog for OneMetric {
        async fn load_all_ids(&self, _service_id: &ServiceId) -> AppResult<Vec<MetricId>> {
            Ok(vec![MetricId::from("hits")])
        }

        async fn load_name(
            &self,
            _service_id: &ServiceId,
            _metric_id: &MetricId,
        ) -> AppResult<Option<String>> {
            Ok(Some("Hits".to_string()))
        }
    }

    struct NoopVersions;

    #[async_trait]
    impl ServiceVersions for NoopVersions {
        async fn incr_version(&self, _service_id: &ServiceId) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_components_share_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let stores = RateLimitStores::new(
            store.clone(),
            &UsageLimitCacheConfig::default(),
            Arc::new(OneMetric),
            Arc::new(NoopVersions),
        );
        let service_id = ServiceId::from("s");

        assert!(
            stores
                .tokens
                .create(&service_id, &ApplicationId::from("app"), "tok", None)
                .await
                .unwrap()
        );
        stores
            .usage_limits
            .save(&UsageLimitAttributes::new("s", "p", "hits").with(Period::Day, 100))
            .await
            .unwrap();

        assert_eq!(
            store
                .get("oauth_access_tokens/service:s/tok")
                .await
                .unwrap(),
            Some("app".to_string())
        );
        let limits = stores
            .usage_limits
            .load_all(&service_id, &PlanId::from("p"))
            .await
            .unwrap();
        assert_eq!(limits.len(), 1);
        assert_eq!(limits[0].value, 100);
    }
}
