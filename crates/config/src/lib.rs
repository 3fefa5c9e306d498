//! config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
    #[serde(default)]
    pub database: Option<i64>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 用量限额批量加载缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct UsageLimitCacheConfig {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// 缓存条目存活时间（秒），不设置时只靠变更失效
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Default for UsageLimitCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_secs: None,
        }
    }
}

fn default_max_capacity() -> u64 {
    10_000
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub redis: RedisConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub usage_limit_cache: UsageLimitCacheConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级：`RATEKEEP_` 环境变量 > `{APP_ENV}.toml` > `default.toml`，
    /// 嵌套字段用双下划线分隔，例如 `RATEKEEP_REDIS__URL`
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("RATEKEEP_").split("__"));

        Self::from_figment(figment)
    }

    /// 从已组装好的 Figment 提取配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
