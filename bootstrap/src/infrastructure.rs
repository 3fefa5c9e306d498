//! 基础设施资源管理

use std::sync::Arc;
use std::time::Duration;

use adapter_redis::{RedisConfig, RedisStore, check_connection, create_connection_manager};
use config::AppConfig;
use errors::{AppError, AppResult};
use ports::KeyValueStore;
use redis::aio::ConnectionManager;
use secrecy::ExposeSecret;
use tracing::info;

use crate::retry::{RetryConfig, with_retry};

/// 基础设施资源容器
pub struct Infrastructure {
    config: AppConfig,
    redis_conn: ConnectionManager,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    ///
    /// Redis 连接建立后先 PING 一次，失败按指数退避重试
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        Self::from_config_with_retry(config, &RetryConfig::default()).await
    }

    pub async fn from_config_with_retry(
        config: AppConfig,
        retry_config: &RetryConfig,
    ) -> AppResult<Self> {
        let redis_config = Self::build_redis_config(&config);
        let redis_conn = with_retry(retry_config, "Redis connection", || {
            let cfg = redis_config.clone();
            async move {
                let mut conn = create_connection_manager(&cfg).await?;
                check_connection(&mut conn).await?;
                Ok::<_, AppError>(conn)
            }
        })
        .await?;
        info!(database = ?config.redis.database, "Redis connection created");

        Ok(Self { config, redis_conn })
    }

    fn build_redis_config(config: &AppConfig) -> RedisConfig {
        let mut redis_config = RedisConfig::new(config.redis.url.expose_secret().as_str())
            .with_connection_timeout(Duration::from_secs(config.redis.connect_timeout_secs));
        if let Some(database) = config.redis.database {
            redis_config = redis_config.with_database(database);
        }
        redis_config
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn redis_connection_manager(&self) -> ConnectionManager {
        self.redis_conn.clone()
    }

    /// Redis 键值存储（实现 `KeyValueStore`）
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(RedisStore::new(self.redis_conn.clone()))
    }

    /// 检查 Redis 连接状态
    ///
    /// 返回 true 表示连接可用
    pub async fn check_redis_connection(&self) -> bool {
        let mut conn = self.redis_conn.clone();
        check_connection(&mut conn).await.is_ok()
    }
}
