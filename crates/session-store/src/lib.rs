//! In-memory session token store with per-entry expiry.
//!
//! This crate provides a thread-safe token store for session data with:
//! - Absolute per-entry expiry, enforced on every lookup
//! - Optional periodic background sweep that reclaims expired entries
//! - Generic payloads (raw bytes by default)
//! - A [`TokenStore`] trait for backend-agnostic callers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use session_store::MemoryStore;
//!
//! let store: MemoryStore = MemoryStore::new(Duration::from_secs(60))?;
//! store.insert_for("token", b"payload".to_vec(), Duration::from_secs(3600))?;
//!
//! assert_eq!(store.get("token"), Some(b"payload".to_vec()));
//! ```

mod backend;
mod config;
mod entry;
mod error;
mod store;
mod sweeper;

pub use backend::TokenStore;
pub use config::{DEFAULT_CLEANUP_INTERVAL, StoreConfig};
pub use entry::{Entry, Expiry};
pub use error::{Error, Result};
pub use store::{MemoryStore, StoreState, StoreStats};
