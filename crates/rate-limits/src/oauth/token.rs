use serde::{Deserialize, Serialize};

/// OAuth access token
///
/// 不作为结构体持久化，读取时由存储状态重建
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAccessToken {
    token: String,
    /// 剩余存活秒数，`None` 表示永不过期
    pub ttl: Option<i64>,
}

impl OAuthAccessToken {
    pub fn new(token: impl Into<String>, ttl: Option<i64>) -> Self {
        Self {
            token: token.into(),
            ttl,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
