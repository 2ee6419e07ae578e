//! Short-TTL in-process cache for aggregate statistics.
//!
//! One slot, one value. Every member write invalidates it; reads within the
//! TTL window skip the store round-trips entirely.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Single-slot TTL cache.
pub struct StatsCache<T> {
    ttl: Duration,
    slot: RwLock<Option<(Instant, T)>>,
}

impl<T: Clone> StatsCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached value if it is still fresh.
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// Stores a freshly computed value.
    pub async fn set(&self, value: T) {
        let mut slot = self.slot.write().await;
        *slot = Some((Instant::now(), value));
    }

    /// Drops the cached value. Called on every member write.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_value_is_returned() {
        let cache = StatsCache::new(Duration::from_secs(60));
        cache.set(7u32).await;
        assert_eq!(cache.get().await, Some(7));
    }

    #[tokio::test]
    async fn invalidate_clears_the_slot() {
        let cache = StatsCache::new(Duration::from_secs(60));
        cache.set(7u32).await;
        cache.invalidate().await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn expired_value_is_not_returned() {
        let cache = StatsCache::new(Duration::from_millis(0));
        cache.set(7u32).await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn empty_cache_returns_none() {
        let cache: StatsCache<u32> = StatsCache::new(Duration::from_secs(60));
        assert_eq!(cache.get().await, None);
    }
}
