use async_trait::async_trait;
use oasis_core::repository::{PageCache, SessionRevocations, StoreResult};
use redis::{AsyncCommands, RedisResult};
use tracing::{debug, warn};

/// Redis-backed page cache and session revocation list.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
    page_ttl_seconds: u64,
}

impl RedisClient {
    pub async fn new(connection_string: &str, page_ttl_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client, page_ttl_seconds })
    }

    pub async fn get_page(&self, path: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(page_key(path)).await
    }

    pub async fn set_page(&self, path: &str, body: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex(page_key(path), body, self.page_ttl_seconds).await
    }

    pub async fn del_page(&self, path: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(page_key(path)).await
    }

    pub async fn set_revoked(&self, token_id: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // Never zero: SET EX rejects it and the token is still valid this second
        conn.set_ex(revoked_key(token_id), 1, ttl_seconds.max(1)).await
    }

    pub async fn exists_revoked(&self, token_id: &str) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.exists(revoked_key(token_id)).await
    }
}

fn page_key(path: &str) -> String {
    format!("page:{}", path)
}

fn revoked_key(token_id: &str) -> String {
    format!("revoked:{}", token_id)
}

#[async_trait]
impl PageCache for RedisClient {
    async fn get(&self, path: &str) -> Option<String> {
        match self.get_page(path).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Page cache read failed for {}: {}", path, e);
                None
            }
        }
    }

    async fn put(&self, path: &str, body: &str) {
        if let Err(e) = self.set_page(path, body).await {
            warn!("Page cache write failed for {}: {}", path, e);
        }
    }

    async fn invalidate(&self, path: &str) {
        match self.del_page(path).await {
            Ok(()) => debug!("Invalidated page {}", path),
            Err(e) => warn!("Page cache invalidation failed for {}: {}", path, e),
        }
    }
}

#[async_trait]
impl SessionRevocations for RedisClient {
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> StoreResult<()> {
        self.set_revoked(token_id, ttl_seconds).await?;
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> StoreResult<bool> {
        Ok(self.exists_revoked(token_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(page_key("/cabins/7"), "page:/cabins/7");
        assert_eq!(revoked_key("abc"), "revoked:abc");
    }
}
