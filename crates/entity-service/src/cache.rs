//! # Cache Provider
//!
//! [`CacheProvider`] is the optional read-through cache an
//! [`EntityService`](crate::EntityService) consults before its repository.
//! The cache is an optimization: the service treats every [`CacheError`] as a
//! miss and carries on.
//!
//! [`MokaCacheProvider`] is backed by `moka::future::Cache`. Capacity-based
//! eviction is moka's; expiry is per entry, using the TTL passed to
//! [`CacheProvider::set`] or the provider's default.

use crate::error::CacheError;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Keyed model cache.
#[async_trait]
pub trait CacheProvider<K, M>: Send + Sync {
    async fn get(&self, key: &K) -> Result<Option<M>, CacheError>;

    async fn set(&self, key: K, model: M, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn invalidate(&self, key: &K) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct Cached<M> {
    model: M,
    ttl: Option<Duration>,
}

struct PerEntryTtl;

impl<K, M> Expiry<K, Cached<M>> for PerEntryTtl {
    fn expire_after_create(&self, _key: &K, value: &Cached<M>, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &K,
        value: &Cached<M>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// [`CacheProvider`] on top of `moka::future::Cache`.
#[derive(Clone)]
pub struct MokaCacheProvider<K, M>
where
    K: Hash + Eq + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    cache: Cache<K, Cached<M>>,
    default_ttl: Option<Duration>,
}

impl<K, M> MokaCacheProvider<K, M>
where
    K: Hash + Eq + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `max_capacity` models.
    /// Entries set without a TTL fall back to `default_ttl`; `None` keeps them
    /// until evicted or invalidated.
    pub fn new(max_capacity: u64, default_ttl: Option<Duration>) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache, default_ttl }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flushes moka's pending maintenance so counts and expiry are current.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl<K, M> CacheProvider<K, M> for MokaCacheProvider<K, M>
where
    K: Hash + Eq + Send + Sync + 'static,
    M: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<Option<M>, CacheError> {
        Ok(self.cache.get(key).await.map(|cached| cached.model))
    }

    async fn set(&self, key: K, model: M, ttl: Option<Duration>) -> Result<(), CacheError> {
        let ttl = ttl.or(self.default_ttl);
        self.cache.insert(key, Cached { model, ttl }).await;
        Ok(())
    }

    async fn invalidate(&self, key: &K) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let cache = MokaCacheProvider::<u32, String>::new(16, None);

        assert_eq!(cache.get(&1).await.unwrap(), None);
        cache.set(1, "Tuition".into(), None).await.unwrap();
        assert_eq!(cache.get(&1).await.unwrap(), Some("Tuition".to_string()));

        cache.invalidate(&1).await.unwrap();
        assert_eq!(cache.get(&1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MokaCacheProvider::<u32, String>::new(16, None);

        cache
            .set(7, "Lab".into(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get(&7).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        cache.sync().await;
        assert_eq!(cache.get(&7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_default_ttl_applies_when_unset() {
        let cache = MokaCacheProvider::<u32, String>::new(16, Some(Duration::from_millis(50)));

        cache.set(3, "Library".into(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get(&3).await.unwrap(), None);
    }
}
