//! 存储键格式
//!
//! 键格式与存量数据共享，必须逐字节保持一致：
//! - `oauth_access_tokens/service:{service_id}/{token}` → application_id
//! - `oauth_access_tokens/service:{service_id}/app:{application_id}/` → token 集合
//! - `usage_limit/service_id:{service_id}/plan_id:{plan_id}/metric_id:{metric_id}/{period}` → 限额

use common::{ApplicationId, MetricId, PlanId, ServiceId, encode_key};

use crate::usage_limit::Period;

/// Token → 应用 ID 的主键
pub fn token_key(service_id: &ServiceId, token: &str) -> String {
    format!("oauth_access_tokens/service:{}/{}", service_id, token)
}

/// 应用的 token 索引集合键
pub fn token_set_key(service_id: &ServiceId, application_id: &ApplicationId) -> String {
    format!(
        "oauth_access_tokens/service:{}/app:{}/",
        service_id, application_id
    )
}

/// 用量限额键前缀
///
/// 指定 `metric_id` 时前缀收窄到该指标，否则以 `metric_id:` 结尾，
/// 由 [`usage_limit_key_for_pair`] 补上指标和周期
pub fn usage_limit_prefix(
    service_id: &ServiceId,
    plan_id: &PlanId,
    metric_id: Option<&MetricId>,
) -> String {
    let metric_segment = metric_id.map(|m| format!("{}/", m)).unwrap_or_default();
    format!(
        "usage_limit/service_id:{}/plan_id:{}/metric_id:{}",
        service_id, plan_id, metric_segment
    )
}

/// 前缀加上 `{metric_id}/{period}` 后做键转义
pub fn usage_limit_key_for_pair(prefix: &str, metric_id: &MetricId, period: Period) -> String {
    encode_key(&format!("{}{}/{}", prefix, metric_id, period))
}

/// 单个限额的完整键
pub fn usage_limit_key(
    service_id: &ServiceId,
    plan_id: &PlanId,
    metric_id: &MetricId,
    period: Period,
) -> String {
    usage_limit_key_for_pair(
        &usage_limit_prefix(service_id, plan_id, None),
        metric_id,
        period,
    )
}
