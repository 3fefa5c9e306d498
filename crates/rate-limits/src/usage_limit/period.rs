use std::fmt;
use std::str::FromStr;

use errors::AppError;
use serde::{Deserialize, Serialize};

/// 限额周期
///
/// 声明顺序即批量加载时的遍历顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Eternity,
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::Eternity,
        Period::Year,
        Period::Month,
        Period::Week,
        Period::Day,
        Period::Hour,
        Period::Minute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Eternity => "eternity",
            Period::Year => "year",
            Period::Month => "month",
            Period::Week => "week",
            Period::Day => "day",
            Period::Hour => "hour",
            Period::Minute => "minute",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown period: {}", s)))
    }
}
