//! Cache abstraction used by the history fetcher

use async_trait::async_trait;
use std::time::Duration;

/// A keyed cache with optional per-entry time-to-live.
///
/// Implementations must check expiry when an entry is read: an expired entry
/// behaves exactly like a missing one.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Clone + Send + Sync,
{
    /// Returns the live value stored for `key`, if any.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous entry. `None` never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
}
