//! Short-lived memory of recently recorded deliveries.
//!
//! Push transports retry, so the same delivery report can arrive several times
//! within seconds. The cache remembers `(user, profile, slot)` keys for a TTL.
//! It is an ordinary value injected into the service that uses it, so each test
//! (or each process) owns its own instance.

use shared::NotificationSlot;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::DeliveryDedupConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryKey {
    pub user_id: String,
    pub profile_id: String,
    pub slot: NotificationSlot,
}

impl DeliveryKey {
    pub fn new(user_id: &str, profile_id: &str, slot: NotificationSlot) -> Self {
        Self {
            user_id: user_id.to_string(),
            profile_id: profile_id.to_string(),
            slot,
        }
    }
}

pub struct DeliveryDedupCache {
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<HashMap<DeliveryKey, Instant>>,
}

impl DeliveryDedupCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &DeliveryDedupConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    pub async fn is_recent(&self, key: &DeliveryKey) -> bool {
        self.is_recent_at(key, Instant::now()).await
    }

    pub async fn is_recent_at(&self, key: &DeliveryKey, now: Instant) -> bool {
        let entries = self.entries.read().await;
        entries.get(key).map(|expires_at| *expires_at > now).unwrap_or(false)
    }

    pub async fn remember(&self, key: DeliveryKey) {
        self.remember_at(key, Instant::now()).await
    }

    /// Record `key` until `now + ttl`.
    ///
    /// Expired entries are purged first; if the cache is still full, the entry
    /// closest to expiry makes room.
    pub async fn remember_at(&self, key: DeliveryKey, now: Instant) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, expires_at)| **expires_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(user_id = %oldest.user_id, "Evicting delivery dedup entry at capacity");
                entries.remove(&oldest);
            }
        }

        entries.insert(key, now + self.ttl);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
