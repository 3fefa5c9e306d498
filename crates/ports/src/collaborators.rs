//! 外部协作实体接口
//!
//! Metric 与 Service 实体由其他模块维护，这里只声明限流核心依赖的能力

use async_trait::async_trait;
use common::{MetricId, ServiceId};
use errors::AppResult;

/// 指标目录
#[async_trait]
pub trait MetricCatalog: Send + Sync {
    /// 服务下全部指标 ID，没有指标时返回空列表
    async fn load_all_ids(&self, service_id: &ServiceId) -> AppResult<Vec<MetricId>>;

    /// 指标名称
    async fn load_name(
        &self,
        service_id: &ServiceId,
        metric_id: &MetricId,
    ) -> AppResult<Option<String>>;
}

/// 服务版本计数器
///
/// 用量限额变更后递增，下游缓存据此判断是否过期
#[async_trait]
pub trait ServiceVersions: Send + Sync {
    async fn incr_version(&self, service_id: &ServiceId) -> AppResult<()>;
}
