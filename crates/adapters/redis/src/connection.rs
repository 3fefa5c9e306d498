//! Redis 连接管理

use errors::{AppError, AppResult};
use redis::aio::ConnectionManager;
use redis::{Client, IntoConnectionInfo};
use tracing::debug;

use crate::config::RedisConfig;

/// 创建 Redis 连接管理器
pub async fn create_connection_manager(config: &RedisConfig) -> AppResult<ConnectionManager> {
    let mut info = config
        .url
        .as_str()
        .into_connection_info()
        .map_err(|e| AppError::configuration(format!("Invalid Redis URL: {}", e)))?;
    if let Some(database) = config.database {
        info.redis.db = database;
    }
    if let Some(password) = &config.password {
        info.redis.password = Some(password.clone());
    }

    let client = Client::open(info)
        .map_err(|e| AppError::storage(format!("Failed to create Redis client: {}", e)))?;

    debug!(timeout_ms = config.connection_timeout.as_millis() as u64, "Connecting to Redis");

    tokio::time::timeout(config.connection_timeout, ConnectionManager::new(client))
        .await
        .map_err(|_| AppError::storage("Redis connection timed out"))?
        .map_err(|e| {
            AppError::storage(format!("Failed to create Redis connection manager: {}", e))
        })
}

/// 检查 Redis 连接
pub async fn check_connection(conn: &mut ConnectionManager) -> AppResult<()> {
    redis::cmd("PING")
        .query_async::<String>(conn)
        .await
        .map_err(|e| AppError::storage(format!("Redis health check failed: {}", e)))?;
    Ok(())
}
