//! Expiring token store with lazy expiry and an optional background sweep.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::entry::{Entry, Expiry};
use crate::error::{Error, Result};
use crate::sweeper::Sweeper;

/// Lifecycle state of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Accepting operations; the sweeper, if one was started, is running.
    Active,
    /// `stop()` was called. Operations still work but nothing sweeps.
    Stopped,
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries physically held, expired or not.
    pub resident: usize,

    /// Entries that have not yet expired.
    pub live: usize,

    /// Whether a background sweeper is running.
    pub sweeping: bool,
}

/// Shared state behind every handle to the same store.
struct Inner<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    sweeper: OnceLock<Sweeper>,
    stopped: AtomicBool,
}

impl<V> Inner<V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            sweeper: OnceLock::new(),
            stopped: AtomicBool::new(false),
        }
    }

    fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let now = Instant::now();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - entries.len();
        if removed > 0 {
            debug!(
                removed = removed,
                remaining = entries.len(),
                "Swept expired tokens"
            );
        }
        removed
    }
}

/// In-memory token store with per-entry absolute expiry.
///
/// The store provides:
/// - Insert/overwrite, lookup and delete by token
/// - Lazy expiry: expired entries are never returned by a lookup
/// - Optional eager reclamation by a periodic background sweep
/// - Thread-safe access via a reader/writer lock
///
/// Lookups only take the read lock and never remove anything, so an expired
/// entry stays resident until the next sweep, a delete, or an overwrite.
///
/// The payload type defaults to raw bytes. Clones of a store share the same
/// entries and sweeper.
pub struct MemoryStore<V = Vec<u8>> {
    inner: Arc<Inner<V>>,
    config: StoreConfig,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a store that sweeps every `cleanup_interval`.
    ///
    /// A zero interval starts no sweeper; expired entries are then only
    /// hidden on read. A non-zero interval must be called from within a
    /// Tokio runtime, which hosts the sweeper task.
    pub fn new(cleanup_interval: Duration) -> Result<Self> {
        Self::with_config(StoreConfig::new().with_cleanup_interval(cleanup_interval))
    }

    /// Create a store that sweeps at the default interval (one minute).
    pub fn with_default_interval() -> Result<Self> {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with no background sweeper.
    pub fn without_sweep() -> Self {
        Self {
            inner: Arc::new(Inner::new()),
            config: StoreConfig::new().without_cleanup(),
        }
    }

    /// Create a store from a configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        if !config.sweep_enabled() {
            return Ok(Self::without_sweep());
        }

        let interval = config.cleanup_interval;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime {
            interval_ms: interval.as_millis(),
        })?;

        let inner = Arc::new(Inner::new());
        let weak = Arc::downgrade(&inner);
        let sweeper = Sweeper::spawn(&runtime, interval, move || match weak.upgrade() {
            Some(inner) => {
                inner.sweep_expired();
                true
            }
            None => false,
        });
        // Freshly created, so the slot is empty.
        let _ = inner.sweeper.set(sweeper);

        Ok(Self { inner, config })
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert a payload under `token`, replacing any existing entry.
    ///
    /// The expiry may be an `Instant` or a `chrono::DateTime<Utc>`.
    pub fn insert(&self, token: &str, value: V, expires_at: impl Into<Expiry>) -> Result<()> {
        let entry = Entry::new(value, expires_at.into().instant());

        let mut entries = self.inner.entries.write();
        let replaced = entries.insert(token.to_string(), entry).is_some();

        trace!(replaced = replaced, resident = entries.len(), "Token inserted");
        Ok(())
    }

    /// Insert a payload under `token` that expires `ttl` from now.
    pub fn insert_for(&self, token: &str, value: V, ttl: Duration) -> Result<()> {
        self.insert(token, value, Expiry::after(ttl))
    }

    /// Get a copy of the payload for `token`.
    ///
    /// Returns `None` if the token is unknown or its entry has expired.
    pub fn get(&self, token: &str) -> Option<V> {
        self.with_ref(token, V::clone)
    }

    /// Read-only access to a live payload without copying it.
    pub fn with_ref<F, R>(&self, token: &str, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let entries = self.inner.entries.read();
        let entry = entries.get(token)?;
        if entry.is_expired() {
            None
        } else {
            Some(f(&entry.value))
        }
    }

    /// Check if a live entry exists for `token`.
    pub fn contains(&self, token: &str) -> bool {
        self.with_ref(token, |_| ()).is_some()
    }

    /// Time left before the entry for `token` expires.
    pub fn remaining(&self, token: &str) -> Option<Duration> {
        let entries = self.inner.entries.read();
        entries.get(token).and_then(Entry::remaining)
    }

    /// Remove the entry for `token`. Removing an unknown token is a no-op.
    pub fn delete(&self, token: &str) -> Result<()> {
        let removed = self.inner.entries.write().remove(token).is_some();
        trace!(removed = removed, "Token deleted");
        Ok(())
    }

    /// List all live tokens.
    pub fn tokens(&self) -> Vec<String> {
        let entries = self.inner.entries.read();
        let now = Instant::now();
        entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(token, _)| token.clone())
            .collect()
    }

    /// Number of entries physically held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Check if the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Remove every expired entry now.
    ///
    /// This is what the background sweeper runs on each tick, but it can
    /// also be called manually. Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired()
    }

    /// Stop the background sweeper.
    ///
    /// The store keeps working; expired entries are just no longer
    /// reclaimed in the background. Calling this without a sweeper, or more
    /// than once, does nothing beyond marking the store stopped.
    pub fn stop(&self) {
        let was_stopped = self.inner.stopped.swap(true, Ordering::SeqCst);
        match self.inner.sweeper.get() {
            Some(sweeper) => sweeper.stop(),
            None => trace!("No sweeper to stop"),
        }
        if !was_stopped {
            debug!("Session store stopped");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        if self.inner.stopped.load(Ordering::SeqCst) {
            StoreState::Stopped
        } else {
            StoreState::Active
        }
    }

    /// Whether a background sweeper is currently running.
    pub fn is_sweeping(&self) -> bool {
        self.inner.sweeper.get().is_some_and(Sweeper::is_running)
    }

    /// Interval of the running sweeper, if one was started.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.inner.sweeper.get().map(Sweeper::interval)
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let entries = self.inner.entries.read();
        let now = Instant::now();
        StoreStats {
            resident: entries.len(),
            live: entries.values().filter(|e| !e.is_expired_at(now)).count(),
            sweeping: self.is_sweeping(),
        }
    }
}

impl<V> Clone for MemoryStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}
