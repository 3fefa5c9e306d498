//! OAuth access token 关联存储

use std::sync::Arc;
use std::time::Duration;

use common::{ApplicationId, ServiceId};
use ports::KeyValueStore;
use tracing::{debug, info, warn};

use super::OAuthAccessToken;
use crate::error::{TokenError, TokenResult};
use crate::keys;

/// token 最大长度（字节）
pub const MAX_TOKEN_LENGTH: usize = 256;

/// Token 关联存储
///
/// 存在性检查和写入不是原子的：并发创建同一个 token 时可能都通过检查，后写者生效
#[derive(Clone)]
pub struct TokenAssociationStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenAssociationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 创建 token 与应用的关联
    ///
    /// token 为空或超长、`ttl` 不为正数时返回 `Ok(false)` 且不写入任何数据；
    /// token 已存在时返回 `AccessTokenAlreadyExists`
    pub async fn create(
        &self,
        service_id: &ServiceId,
        application_id: &ApplicationId,
        token: &str,
        ttl: Option<i64>,
    ) -> TokenResult<bool> {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            debug!(service_id = %service_id, len = token.len(), "Rejected malformed access token");
            return Ok(false);
        }

        let key = keys::token_key(service_id, token);
        if self.store.get(&key).await?.is_some() {
            return Err(TokenError::AccessTokenAlreadyExists(token.to_string()));
        }

        let expiry = match ttl {
            None => None,
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs as u64)),
            Some(secs) => {
                debug!(service_id = %service_id, ttl = secs, "Rejected non-positive access token ttl");
                return Ok(false);
            }
        };

        self.store
            .set(&key, application_id.as_str(), expiry)
            .await?;
        self.store
            .sadd(&keys::token_set_key(service_id, application_id), token)
            .await?;

        info!(
            service_id = %service_id,
            application_id = %application_id,
            ttl = ?ttl,
            "Access token created"
        );
        Ok(true)
    }

    /// 删除 token
    ///
    /// 只删除主键。调用方不知道所属应用，索引中的残留由读取时清理
    pub async fn delete(&self, service_id: &ServiceId, token: &str) -> TokenResult<()> {
        self.store
            .delete(&keys::token_key(service_id, token))
            .await?;
        info!(service_id = %service_id, "Access token deleted");
        Ok(())
    }

    /// 应用下所有存活的 token（顺序不保证）
    ///
    /// 索引中指向已过期或已删除 token 的成员会在这里被移除
    pub async fn all_by_service_and_application(
        &self,
        service_id: &ServiceId,
        application_id: &ApplicationId,
    ) -> TokenResult<Vec<OAuthAccessToken>> {
        let set_key = keys::token_set_key(service_id, application_id);
        let tokens = self.store.smembers(&set_key).await?;
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let token_keys: Vec<String> = tokens
            .iter()
            .map(|token| keys::token_key(service_id, token))
            .collect();
        let applications = self.store.mget(&token_keys).await?;

        let mut live = Vec::with_capacity(tokens.len());
        let mut repaired = 0u64;
        for ((token, key), application) in tokens.into_iter().zip(&token_keys).zip(applications) {
            match application {
                Some(_) => {
                    let ttl = self.store.ttl(key).await?;
                    live.push(OAuthAccessToken::new(token, ttl));
                }
                None => {
                    self.store.srem(&set_key, &token).await?;
                    repaired += 1;
                }
            }
        }

        if repaired > 0 {
            warn!(
                service_id = %service_id,
                application_id = %application_id,
                repaired,
                "Removed stale access tokens from application index"
            );
            metrics::counter!("oauth_token_index_repairs_total").increment(repaired);
        }

        Ok(live)
    }

    /// token 关联的应用 ID
    ///
    /// 主键不存在时无法得知所属应用，索引修复留给 `all_by_service_and_application`
    pub async fn get_application_id(
        &self,
        service_id: &ServiceId,
        token: &str,
    ) -> TokenResult<Option<ApplicationId>> {
        let application_id = self
            .store
            .get(&keys::token_key(service_id, token))
            .await?
            .map(ApplicationId::from);

        if application_id.is_none() {
            debug!(service_id = %service_id, "Access token not found");
        }
        Ok(application_id)
    }
}
