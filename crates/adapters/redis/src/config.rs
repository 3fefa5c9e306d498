//! Redis 配置模块

use std::time::Duration;

/// Redis 配置
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL
    pub url: String,
    /// 数据库索引，覆盖 URL 中的设置
    pub database: Option<i64>,
    /// 密码，覆盖 URL 中的设置
    pub password: Option<String>,
    /// 建立连接超时
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            database: None,
            password: None,
            connection_timeout: Duration::from_secs(10),
        }
    }
}

impl RedisConfig {
    /// 创建新的配置
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// 设置密码
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// 设置数据库索引
    pub fn with_database(mut self, database: i64) -> Self {
        self.database = Some(database);
        self
    }

    /// 设置连接超时
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}
