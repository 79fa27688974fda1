//! Error types for session store operations.

/// Error type for session store operations.
///
/// Lookups never fail: a missing or expired token is reported as `None`.
/// The in-memory store only errors when it is asked to start a sweeper
/// somewhere it cannot run one.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A background sweep was requested outside of a Tokio runtime.
    #[error("No Tokio runtime available to run the sweeper (interval: {interval_ms}ms)")]
    NoRuntime {
        /// The requested sweep interval in milliseconds.
        interval_ms: u128,
    },

    /// Error reported by a non-memory backend implementing the store contract.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
