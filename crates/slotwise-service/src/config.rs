//! Runtime configuration for the service layer.

use tracing::warn;

pub const EXPANSION_DAYS_ENV: &str = "RECURRENCE_EXPANSION_DAYS";
const DEFAULT_EXPANSION_DAYS: i64 = 90;

/// Knobs the service reads at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Horizon, in days from the requested start, over which a recurring
    /// booking's occurrences are expanded for write-time conflict checks.
    pub expansion_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            expansion_days: DEFAULT_EXPANSION_DAYS,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let expansion_days = match std::env::var(EXPANSION_DAYS_ENV) {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    warn!(
                        value = %raw,
                        "ignoring unparseable {}, using default", EXPANSION_DAYS_ENV
                    );
                    DEFAULT_EXPANSION_DAYS
                }
            },
            Err(_) => DEFAULT_EXPANSION_DAYS,
        };
        Self { expansion_days }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_expansion_horizon_is_ninety_days() {
        assert_eq!(ServiceConfig::default().expansion_days, 90);
    }
}
