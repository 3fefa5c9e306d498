//! 用量限额注册表

use std::sync::Arc;

use common::{MetricId, PlanId, ServiceId};
use errors::AppResult;
use futures::FutureExt;
use ports::{KeyValueStore, MemoCache, MetricCatalog, ServiceVersions};
use tracing::{debug, info, warn};

use super::limit::coerce_integer;
use super::{Period, UsageLimit, UsageLimitAttributes};
use crate::keys;

/// 批量加载缓存的键
pub type PlanKey = (ServiceId, PlanId);

/// 批量加载缓存
pub type UsageLimitCache = Arc<dyn MemoCache<PlanKey, Vec<UsageLimit>>>;

/// 用量限额注册表
///
/// `load_all` 结果按 (service, plan) 缓存，`save` / `delete` 后立即失效，
/// 同时递增服务版本号，通知下游的派生缓存
#[derive(Clone)]
pub struct UsageLimitRegistry {
    store: Arc<dyn KeyValueStore>,
    metrics: Arc<dyn MetricCatalog>,
    services: Arc<dyn ServiceVersions>,
    cache: UsageLimitCache,
}

impl UsageLimitRegistry {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        metrics: Arc<dyn MetricCatalog>,
        services: Arc<dyn ServiceVersions>,
        cache: UsageLimitCache,
    ) -> Self {
        Self {
            store,
            metrics,
            services,
            cache,
        }
    }

    /// 方案下所有已配置的限额（带缓存）
    pub async fn load_all(
        &self,
        service_id: &ServiceId,
        plan_id: &PlanId,
    ) -> AppResult<Vec<UsageLimit>> {
        let key = (service_id.clone(), plan_id.clone());
        self.cache
            .get_or_populate(key, self.fetch_all(service_id, plan_id).boxed())
            .await
    }

    async fn fetch_all(
        &self,
        service_id: &ServiceId,
        plan_id: &PlanId,
    ) -> AppResult<Vec<UsageLimit>> {
        metrics::counter!("usage_limit_cache_misses_total").increment(1);

        let metric_ids = self.metrics.load_all_ids(service_id).await?;
        if metric_ids.is_empty() {
            debug!(service_id = %service_id, plan_id = %plan_id, "Service has no metrics");
            return Ok(Vec::new());
        }

        let pairs: Vec<(&MetricId, Period)> = metric_ids
            .iter()
            .flat_map(|metric_id| Period::ALL.into_iter().map(move |period| (metric_id, period)))
            .collect();

        let prefix = keys::usage_limit_prefix(service_id, plan_id, None);
        let storage_keys: Vec<String> = pairs
            .iter()
            .map(|(metric_id, period)| keys::usage_limit_key_for_pair(&prefix, metric_id, *period))
            .collect();

        let values = self.store.mget(&storage_keys).await?;

        let limits: Vec<UsageLimit> = pairs
            .into_iter()
            .zip(values)
            .filter_map(|((metric_id, period), raw)| {
                raw.map(|raw| UsageLimit {
                    service_id: service_id.clone(),
                    plan_id: plan_id.clone(),
                    metric_id: metric_id.clone(),
                    period,
                    value: coerce_integer(&raw),
                })
            })
            .collect();

        debug!(
            service_id = %service_id,
            plan_id = %plan_id,
            metrics = metric_ids.len(),
            limits = limits.len(),
            "Loaded usage limits"
        );

        Ok(limits)
    }

    /// 单个限额（不经过缓存）
    pub async fn load_value(
        &self,
        service_id: &ServiceId,
        plan_id: &PlanId,
        metric_id: &MetricId,
        period: Period,
    ) -> AppResult<Option<i64>> {
        let key = keys::usage_limit_key(service_id, plan_id, metric_id, period);
        let raw = self.store.get(&key).await?;
        Ok(raw.map(|raw| coerce_integer(&raw)))
    }

    /// 写入所有已设置周期的限额（覆盖）
    ///
    /// 无论写了几个周期，缓存只失效一次，服务版本号只递增一次
    pub async fn save(&self, attributes: &UsageLimitAttributes) -> AppResult<()> {
        let mut written = 0usize;
        for (period, value) in attributes.periods() {
            let key = keys::usage_limit_key(
                &attributes.service_id,
                &attributes.plan_id,
                &attributes.metric_id,
                period,
            );
            self.store.set(&key, &value.to_string(), None).await?;
            written += 1;
        }

        info!(
            service_id = %attributes.service_id,
            plan_id = %attributes.plan_id,
            metric_id = %attributes.metric_id,
            periods = written,
            "Usage limits saved"
        );

        self.after_mutation(&attributes.service_id, &attributes.plan_id)
            .await
    }

    /// 删除单个限额
    pub async fn delete(
        &self,
        service_id: &ServiceId,
        plan_id: &PlanId,
        metric_id: &MetricId,
        period: Period,
    ) -> AppResult<()> {
        let key = keys::usage_limit_key(service_id, plan_id, metric_id, period);
        self.store.delete(&key).await?;

        info!(
            service_id = %service_id,
            plan_id = %plan_id,
            metric_id = %metric_id,
            period = %period,
            "Usage limit deleted"
        );

        self.after_mutation(service_id, plan_id).await
    }

    async fn after_mutation(&self, service_id: &ServiceId, plan_id: &PlanId) -> AppResult<()> {
        metrics::counter!("usage_limit_mutations_total").increment(1);

        self.cache
            .invalidate(&(service_id.clone(), plan_id.clone()))
            .await;

        if let Err(e) = self.services.incr_version(service_id).await {
            warn!(service_id = %service_id, error = %e, "Failed to bump service version");
            return Err(e);
        }
        Ok(())
    }
}
