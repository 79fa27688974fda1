//! Configuration for the session store.

use std::time::Duration;

/// Default interval between background sweeps of expired tokens.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Interval between background sweeps.
    /// `Duration::ZERO` disables the sweeper; expired tokens are then only
    /// hidden on read and stay resident until deleted or overwritten.
    pub cleanup_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Disable the background sweeper.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup_interval = Duration::ZERO;
        self
    }

    /// Whether this configuration starts a background sweeper.
    pub fn sweep_enabled(&self) -> bool {
        !self.cleanup_interval.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL);
        assert!(config.sweep_enabled());
    }

    #[test]
    fn test_without_cleanup() {
        let config = StoreConfig::new().without_cleanup();
        assert_eq!(config.cleanup_interval, Duration::ZERO);
        assert!(!config.sweep_enabled());
    }

    #[test]
    fn test_custom_interval() {
        let config = StoreConfig::new().with_cleanup_interval(Duration::from_millis(500));
        assert_eq!(config.cleanup_interval, Duration::from_millis(500));
        assert!(config.sweep_enabled());
    }
}
