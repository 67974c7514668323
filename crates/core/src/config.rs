//! Engine configuration loaded from environment variables.

use std::str::FromStr;

use crate::coordinator::MIN_CONFIDENCE_THRESHOLD;
use crate::error::CoreError;
use crate::signals::ensure_confidence;

/// Default cap on events returned by an active-events query.
pub const DEFAULT_ACTIVE_LIMIT: i64 = 10;

/// Tunables for detection and persistence.
///
/// All fields have defaults matching production behaviour; override via
/// environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum confidence for a candidate to be persisted.
    pub min_confidence: f64,
    /// Maximum number of active events returned per user.
    pub active_limit: i64,
    /// Total persistence attempts, including the first.
    pub persist_attempts: u32,
    /// Delay before the first persistence retry.
    pub retry_initial_ms: u64,
    /// Upper bound on the delay between persistence retries.
    pub retry_max_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE_THRESHOLD,
            active_limit: DEFAULT_ACTIVE_LIMIT,
            persist_attempts: 3,
            retry_initial_ms: 200,
            retry_max_ms: 2_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `LIFE_EVENT_MIN_CONFIDENCE`   | `0.7`   |
    /// | `LIFE_EVENT_ACTIVE_LIMIT`     | `10`    |
    /// | `LIFE_EVENT_PERSIST_ATTEMPTS` | `3`     |
    /// | `LIFE_EVENT_RETRY_INITIAL_MS` | `200`   |
    /// | `LIFE_EVENT_RETRY_MAX_MS`     | `2000`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            min_confidence: parse_or(&lookup, "LIFE_EVENT_MIN_CONFIDENCE", defaults.min_confidence)?,
            active_limit: parse_or(&lookup, "LIFE_EVENT_ACTIVE_LIMIT", defaults.active_limit)?,
            persist_attempts: parse_or(&lookup, "LIFE_EVENT_PERSIST_ATTEMPTS", defaults.persist_attempts)?,
            retry_initial_ms: parse_or(&lookup, "LIFE_EVENT_RETRY_INITIAL_MS", defaults.retry_initial_ms)?,
            retry_max_ms: parse_or(&lookup, "LIFE_EVENT_RETRY_MAX_MS", defaults.retry_max_ms)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        ensure_confidence(self.min_confidence, "LIFE_EVENT_MIN_CONFIDENCE")?;
        // Raising the threshold is allowed; lowering it would store weaker events.
        if self.min_confidence < MIN_CONFIDENCE_THRESHOLD {
            return Err(CoreError::Validation(format!(
                "LIFE_EVENT_MIN_CONFIDENCE must be at least {MIN_CONFIDENCE_THRESHOLD}, got {}",
                self.min_confidence
            )));
        }
        if self.active_limit < 1 {
            return Err(CoreError::Validation(format!(
                "LIFE_EVENT_ACTIVE_LIMIT must be at least 1, got {}",
                self.active_limit
            )));
        }
        if self.persist_attempts < 1 {
            return Err(CoreError::Validation(
                "LIFE_EVENT_PERSIST_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.retry_initial_ms > self.retry_max_ms {
            return Err(CoreError::Validation(format!(
                "LIFE_EVENT_RETRY_INITIAL_MS ({}) exceeds LIFE_EVENT_RETRY_MAX_MS ({})",
                self.retry_initial_ms, self.retry_max_ms
            )));
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("{key} has an invalid value '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<EngineConfig, CoreError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(load(&[]).unwrap(), EngineConfig::default());
        assert_eq!(EngineConfig::default().min_confidence, 0.7);
        assert_eq!(EngineConfig::default().active_limit, 10);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("LIFE_EVENT_MIN_CONFIDENCE", "0.8"),
            ("LIFE_EVENT_PERSIST_ATTEMPTS", " 5 "),
        ])
        .unwrap();
        assert_eq!(config.min_confidence, 0.8);
        assert_eq!(config.persist_attempts, 5);
    }

    #[test]
    fn unparsable_value_is_a_validation_error() {
        let err = load(&[("LIFE_EVENT_ACTIVE_LIMIT", "ten")]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("LIFE_EVENT_ACTIVE_LIMIT"));
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        assert!(load(&[("LIFE_EVENT_MIN_CONFIDENCE", "1.5")]).is_err());
    }

    #[test]
    fn threshold_below_floor_is_rejected() {
        let err = load(&[("LIFE_EVENT_MIN_CONFIDENCE", "0.3")]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("at least 0.7"));
        assert!(load(&[("LIFE_EVENT_MIN_CONFIDENCE", "0.7")]).is_ok());
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert!(load(&[("LIFE_EVENT_PERSIST_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn inverted_retry_bounds_are_rejected() {
        assert!(load(&[("LIFE_EVENT_RETRY_INITIAL_MS", "5000")]).is_err());
    }
}
