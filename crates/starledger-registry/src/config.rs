//! Registry configuration.

use std::time::Duration;

/// Default validation window, in seconds.
pub const DEFAULT_VALIDATION_WINDOW_SECS: u64 = 300;

/// Configuration for the [`ValidationRegistry`](crate::ValidationRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long a pending claim stays open for signature verification.
    pub validation_window: Duration,
}

impl RegistryConfig {
    pub fn with_validation_window(mut self, window: Duration) -> Self {
        self.validation_window = window;
        self
    }

    /// The window in whole seconds, rounded up.
    ///
    /// Claims are timed against a seconds clock, so a sub-second window
    /// still gives the wallet one full second.
    pub fn window_secs(&self) -> u64 {
        let secs = self.validation_window.as_secs();
        if self.validation_window.subsec_nanos() > 0 {
            secs.saturating_add(1)
        } else {
            secs
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            validation_window: Duration::from_secs(DEFAULT_VALIDATION_WINDOW_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_secs_rounds_up() {
        let config = RegistryConfig::default();
        assert_eq!(config.window_secs(), 300);

        let config = config.with_validation_window(Duration::from_millis(500));
        assert_eq!(config.window_secs(), 1);

        let config = config.with_validation_window(Duration::from_millis(30_001));
        assert_eq!(config.window_secs(), 31);

        let config = config.with_validation_window(Duration::ZERO);
        assert_eq!(config.window_secs(), 0);
    }
}
