//! Notary configuration.

use std::time::Duration;

use starledger_registry::RegistryConfig;
use starledger_store::SqliteConfig;
use tracing::warn;

/// Environment variable overriding the validation window, in seconds.
pub const ENV_VALIDATION_WINDOW_SECS: &str = "STARLEDGER_VALIDATION_WINDOW_SECS";

/// Environment variable overriding the SQLite busy timeout, in milliseconds.
pub const ENV_SQLITE_BUSY_TIMEOUT_MS: &str = "STARLEDGER_SQLITE_BUSY_TIMEOUT_MS";

/// Configuration for the [`Notary`](crate::Notary).
#[derive(Debug, Clone, Default)]
pub struct NotaryConfig {
    /// Claim registry settings.
    pub registry: RegistryConfig,
    /// SQLite settings, used by [`Notary::open_sqlite`](crate::Notary::open_sqlite).
    pub sqlite: SqliteConfig,
}

impl NotaryConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_var(&lookup, ENV_VALIDATION_WINDOW_SECS) {
            config.registry.validation_window = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var(&lookup, ENV_SQLITE_BUSY_TIMEOUT_MS) {
            config.sqlite.busy_timeout = Duration::from_millis(ms);
        }

        config
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(key, value = %raw, "ignoring invalid configuration value");
            None
        }
    }
}
