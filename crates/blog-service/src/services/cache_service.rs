use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::utils::{cache_keys::CacheKeys, errors::app_error::AppError};

use super::redis_service::RedisService;

/// Time-windowed cache of rendered view documents, keyed by request URI.
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get_page(&self, uri: &str) -> Result<Option<String>, AppError>;

    async fn set_page(&self, uri: &str, body: &str, ttl_seconds: u64) -> Result<(), AppError>;

    /// Drops every cached page.
    async fn clear(&self) -> Result<(), AppError>;
}

#[async_trait]
impl PageCache for RedisService {
    async fn get_page(&self, uri: &str) -> Result<Option<String>, AppError> {
        Ok(self.get_cached(&CacheKeys::page_key(uri)).await?)
    }

    async fn set_page(&self, uri: &str, body: &str, ttl_seconds: u64) -> Result<(), AppError> {
        self.set_cached(&CacheKeys::page_key(uri), &body, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.delete_pattern(CacheKeys::PAGE_PATTERN).await?;
        Ok(())
    }
}

/// In-process page cache used when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryPageCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageCache for MemoryPageCache {
    async fn get_page(&self, uri: &str) -> Result<Option<String>, AppError> {
        let entries = self.entries.read().await;
        let page = entries
            .get(&CacheKeys::page_key(uri))
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(body, _)| body.clone());

        Ok(page)
    }

    async fn set_page(&self, uri: &str, body: &str, ttl_seconds: u64) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(
            CacheKeys::page_key(uri),
            (body.to_string(), now + Duration::from_secs(ttl_seconds)),
        );

        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_round_trip_and_clear() {
        let cache = MemoryPageCache::new();
        assert!(cache.get_page("/").await.unwrap().is_none());

        cache.set_page("/", "{\"template\":\"index.html\"}", 20).await.unwrap();
        assert_eq!(
            cache.get_page("/").await.unwrap().as_deref(),
            Some("{\"template\":\"index.html\"}")
        );
        assert!(cache.get_page("/?page=2").await.unwrap().is_none());

        cache.clear().await.unwrap();
        assert!(cache.get_page("/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_entry_expires() {
        let cache = MemoryPageCache::new();
        cache.set_page("/", "body", 0).await.unwrap();
        assert!(cache.get_page("/").await.unwrap().is_none());
    }
}
