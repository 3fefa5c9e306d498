//! 通用类型定义
//!
//! 所有标识符都是后端分配的不透明字符串，按原样写入存储键

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// 服务 ID
    ServiceId
);

string_id!(
    /// 应用 ID
    ApplicationId
);

string_id!(
    /// 计费方案 ID
    PlanId
);

string_id!(
    /// 指标 ID
    MetricId
);
