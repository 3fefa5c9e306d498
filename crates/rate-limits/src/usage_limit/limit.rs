use std::collections::HashMap;

use common::{MetricId, PlanId, ServiceId};
use errors::AppResult;
use ports::MetricCatalog;
use serde::{Deserialize, Serialize};

use super::Period;

/// 周期 → 指标 → 已用量
pub type UsageSnapshot = HashMap<Period, HashMap<MetricId, i64>>;

/// 用量限额
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimit {
    pub service_id: ServiceId,
    pub plan_id: PlanId,
    pub metric_id: MetricId,
    pub period: Period,
    pub value: i64,
}

impl UsageLimit {
    /// 用量是否在限额之内
    ///
    /// 该周期没有任何用量记录时视为满足；周期存在但指标缺失时按 0 计
    pub fn validate(&self, usage: &UsageSnapshot) -> bool {
        match usage.get(&self.period) {
            Some(by_metric) => {
                let used = by_metric.get(&self.metric_id).copied().unwrap_or(0);
                used <= self.value
            }
            None => true,
        }
    }

    /// 指标名称
    pub async fn metric_name(&self, metrics: &dyn MetricCatalog) -> AppResult<Option<String>> {
        metrics.load_name(&self.service_id, &self.metric_id).await
    }
}

/// `save` 的输入：每个周期一个可选值，未设置的周期不写入
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageLimitAttributes {
    pub service_id: ServiceId,
    pub plan_id: PlanId,
    pub metric_id: MetricId,
    #[serde(default)]
    pub eternity: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub week: Option<i64>,
    #[serde(default)]
    pub day: Option<i64>,
    #[serde(default)]
    pub hour: Option<i64>,
    #[serde(default)]
    pub minute: Option<i64>,
}

impl UsageLimitAttributes {
    pub fn new(
        service_id: impl Into<ServiceId>,
        plan_id: impl Into<PlanId>,
        metric_id: impl Into<MetricId>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            plan_id: plan_id.into(),
            metric_id: metric_id.into(),
            ..Default::default()
        }
    }

    pub fn with(mut self, period: Period, value: i64) -> Self {
        *self.slot_mut(period) = Some(value);
        self
    }

    pub fn get(&self, period: Period) -> Option<i64> {
        match period {
            Period::Eternity => self.eternity,
            Period::Year => self.year,
            Period::Month => self.month,
            Period::Week => self.week,
            Period::Day => self.day,
            Period::Hour => self.hour,
            Period::Minute => self.minute,
        }
    }

    /// 已设置的周期及其值，按周期声明顺序
    pub fn periods(&self) -> impl Iterator<Item = (Period, i64)> + '_ {
        Period::ALL
            .into_iter()
            .filter_map(|period| self.get(period).map(|value| (period, value)))
    }

    fn slot_mut(&mut self, period: Period) -> &mut Option<i64> {
        match period {
            Period::Eternity => &mut self.eternity,
            Period::Year => &mut self.year,
            Period::Month => &mut self.month,
            Period::Week => &mut self.week,
            Period::Day => &mut self.day,
            Period::Hour => &mut self.hour,
            Period::Minute => &mut self.minute,
        }
    }
}

/// 把存储中的原始值解析为整数
///
/// 取开头的可选符号和数字，没有数字时为 0（与写入方的宽松格式兼容）
pub(crate) fn coerce_integer(raw: &str) -> i64 {
    if let Ok(value) = raw.trim().parse::<i64>() {
        return value;
    }

    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(period: Period, value: i64) -> UsageLimit {
        UsageLimit {
            service_id: ServiceId::from("s"),
            plan_id: PlanId::from("p"),
            metric_id: MetricId::from("hits"),
            period,
            value,
        }
    }

    fn usage(period: Period, metric: &str, count: i64) -> UsageSnapshot {
        HashMap::from([(period, HashMap::from([(MetricId::from(metric), count)]))])
    }

    #[test]
    fn test_validate_within_and_over_limit() {
        let limit = limit(Period::Day, 100);

        assert!(limit.validate(&usage(Period::Day, "hits", 99)));
        assert!(limit.validate(&usage(Period::Day, "hits", 100)));
        assert!(!limit.validate(&usage(Period::Day, "hits", 101)));
    }

    #[test]
    fn test_validate_missing_usage() {
        let limit = limit(Period::Day, 0);

        // 周期没有记录
        assert!(limit.validate(&UsageSnapshot::new()));
        assert!(limit.validate(&usage(Period::Hour, "hits", 500)));
        // 周期存在但指标缺失，按 0 计
        assert!(limit.validate(&usage(Period::Day, "other", 500)));
    }

    #[test]
    fn test_attributes_periods_in_declared_order() {
        let attrs = UsageLimitAttributes::new("s", "p", "m")
            .with(Period::Hour, 10)
            .with(Period::Day, 100)
            .with(Period::Eternity, 0);

        let periods: Vec<_> = attrs.periods().collect();
        assert_eq!(
            periods,
            vec![(Period::Eternity, 0), (Period::Day, 100), (Period::Hour, 10)]
        );
        assert_eq!(attrs.get(Period::Week), None);
    }

    #[test]
    fn test_attributes_deserialize_sparse_periods() {
        let attrs: UsageLimitAttributes = serde_json::from_str(
            r#"{"service_id": "s", "plan_id": "p", "metric_id": "m", "day": 100}"#,
        )
        .unwrap();

        assert_eq!(attrs.day, Some(100));
        assert_eq!(attrs.periods().count(), 1);
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer("100"), 100);
        assert_eq!(coerce_integer("-5"), -5);
        assert_eq!(coerce_integer("12abc"), 12);
        assert_eq!(coerce_integer("abc"), 0);
        assert_eq!(coerce_integer(""), 0);
        assert_eq!(coerce_integer(&i64::MAX.to_string()), i64::MAX);
        assert_eq!(coerce_integer(&i64::MIN.to_string()), i64::MIN);
        assert_eq!(coerce_integer(" 42 "), 42);
    }
}
