//! 内存键值存储实现
//!
//! 语义对齐 Redis：过期键在访问时惰性清除，集合的最后一个成员被移除后键随之删除，
//! 对类型不匹配的键执行操作返回 WRONGTYPE 错误

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use errors::{AppError, AppResult};
use parking_lot::Mutex;
use ports::KeyValueStore;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 内存键值存储
///
/// 时钟取自 tokio，测试中可以用暂停的时钟推进过期
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的键数量
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空所有数据
    pub fn flush(&self) {
        self.entries.lock().clear();
    }

    fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
        let now = Instant::now();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }

    fn invalid_expire() -> AppError {
        AppError::storage("invalid expire time in 'set' command")
    }

    fn wrong_type(key: &str) -> AppError {
        AppError::storage(format!(
            "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
            key
        ))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut entries = self.entries.lock();
        match Self::live(&mut entries, key) {
            Some(Entry {
                value: Value::Str(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(_) => Err(Self::wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let expires_at = match ttl {
            None => None,
            Some(ttl) if ttl.is_zero() => return Err(Self::invalid_expire()),
            Some(ttl) => Some(
                Instant::now()
                    .checked_add(ttl)
                    .ok_or_else(Self::invalid_expire)?,
            ),
        };

        let entry = Entry {
            value: Value::Str(value.to_string()),
            expires_at,
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        let mut entries = self.entries.lock();
        let values = keys
            .iter()
            .map(|key| match Self::live(&mut entries, key) {
                Some(Entry {
                    value: Value::Str(value),
                    ..
                }) => Some(value.clone()),
                // MGET 对非字符串键返回 nil
                _ => None,
            })
            .collect();
        Ok(values)
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
        let mut entries = self.entries.lock();
        let remaining = Self::live(&mut entries, key)
            .and_then(|entry| entry.expires_at)
            .map(|at| {
                let left = at.saturating_duration_since(Instant::now());
                // 与 Redis TTL 一致，向上取整到秒
                left.as_millis().div_ceil(1000) as i64
            });
        Ok(remaining)
    }

    async fn sadd(&self, key: &str, member: &str) -> AppResult<()> {
        let mut entries = self.entries.lock();
        match Self::live(&mut entries, key) {
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => {
                members.insert(member.to_string());
            }
            Some(_) => return Err(Self::wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Set(HashSet::from([member.to_string()])),
                        expires_at: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> AppResult<()> {
        let mut entries = self.entries.lock();
        let now_empty = match Self::live(&mut entries, key) {
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => {
                members.remove(member);
                members.is_empty()
            }
            Some(_) => return Err(Self::wrong_type(key)),
            None => false,
        };
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> AppResult<Vec<String>> {
        let mut entries = self.entries.lock();
        match Self::live(&mut entries, key) {
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(Self::wrong_type(key)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();

        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.ttl("k").await.unwrap(), None);

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiring_set() {
        let store = MemoryStore::new();

        store
            .set("k", "v", Some(Duration::from_secs(10)))
            .await
            .unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), Some(10));

        tokio::time::advance(Duration::from_millis(4500)).await;
        assert_eq!(store.ttl("k").await.unwrap(), Some(6));
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.ttl("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_set_clears_expiry() {
        let store = MemoryStore::new();

        store
            .set("k", "old", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        store.set("k", "new", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected() {
        let store = MemoryStore::new();
        let result = store.set("k", "v", Some(Duration::ZERO)).await;
        assert!(result.is_err());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_rejected() {
        let store = MemoryStore::new();
        let result = store
            .set("k", "v", Some(Duration::from_secs(i64::MAX as u64)))
            .await;
        assert_eq!(
            result,
            Err(AppError::storage("invalid expire time in 'set' command"))
        );
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mget_preserves_order() {
        let store = MemoryStore::new();
        store.set("a", "1", None).await.unwrap();
        store.set("c", "3", None).await.unwrap();
        store.sadd("s", "m").await.unwrap();

        let keys = ["a", "b", "c", "s"].map(String::from);
        let values = store.mget(&keys).await.unwrap();

        assert_eq!(
            values,
            vec![Some("1".to_string()), None, Some("3".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_set_membership() {
        let store = MemoryStore::new();

        store.sadd("s", "a").await.unwrap();
        store.sadd("s", "b").await.unwrap();
        store.sadd("s", "a").await.unwrap();

        let mut members = store.smembers("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b"]);

        store.srem("s", "a").await.unwrap();
        store.srem("s", "missing").await.unwrap();
        assert_eq!(store.smembers("s").await.unwrap(), vec!["b"]);

        // 移除最后一个成员后键被删除
        store.srem("s", "b").await.unwrap();
        assert!(store.is_empty());
        assert!(store.smembers("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_type_errors() {
        let store = MemoryStore::new();
        store.set("str", "v", None).await.unwrap();
        store.sadd("set", "m").await.unwrap();

        assert!(store.sadd("str", "m").await.is_err());
        assert!(store.smembers("str").await.is_err());
        assert!(store.get("set").await.is_err());
    }
}
