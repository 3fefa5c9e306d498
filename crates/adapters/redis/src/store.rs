//! Redis KeyValueStore 实现

use async_trait::async_trait;
use errors::{AppError, AppResult};
use ports::KeyValueStore;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Redis 键值存储
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn map_err(op: &'static str) -> impl Fn(redis::RedisError) -> AppError {
        move |e| AppError::storage(format!("Redis {} failed: {}", op, e))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(Self::map_err("get"))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => conn
                .set_ex(key, value, duration.as_secs())
                .await
                .map_err(Self::map_err("setex")),
            None => conn.set(key, value).await.map_err(Self::map_err("set")),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(Self::map_err("del"))
    }

    async fn mget(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        // 显式使用 MGET，单个键时结果依然是数组
        let mut conn = self.conn.clone();
        redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err("mget"))
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(key).await.map_err(Self::map_err("ttl"))?;

        // -2 表示键不存在，-1 表示没有过期时间
        match ttl {
            -2 | -1 => Ok(None),
            t => Ok(Some(t)),
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.sadd(key, member).await.map_err(Self::map_err("sadd"))?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.srem(key, member).await.map_err(Self::map_err("srem"))?;
        Ok(())
    }

    async fn smembers(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(key).await.map_err(Self::map_err("smembers"))
    }
}
