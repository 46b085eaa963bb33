//! Runtime Configuration
//!
//! Tunables for a [`Runtime`](crate::Runtime). Every field has a default, so
//! a configuration document only needs to name what it overrides:
//!
//! ```rust,ignore
//! let config = RuntimeConfig::from_json(r#"{ "frame_budget_ms": 8 }"#)?;
//! let runtime = Runtime::with_config(MemoryDocument::new(), config);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for the reconciliation runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Prop-name prefix that marks an event handler (`onClick` -> `click`).
    pub event_prefix: String,

    /// A turn yields once its deadline has less than this many microseconds left.
    pub yield_threshold_us: u64,

    /// Length of one turn of the async host loop, in milliseconds.
    pub frame_budget_ms: u64,

    /// Check hook kind and count stability between renders and fail the
    /// turn on a violation.
    pub validate_hooks: bool,
}

impl RuntimeConfig {
    /// Parse a configuration from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The yield threshold as a [`Duration`].
    pub fn yield_threshold(&self) -> Duration {
        Duration::from_micros(self.yield_threshold_us)
    }

    /// The per-turn budget of the async host loop as a [`Duration`].
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_prefix: "on".to_string(),
            yield_threshold_us: 1_000,
            frame_budget_ms: 16,
            validate_hooks: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RuntimeConfig::from_json(r#"{ "frame_budget_ms": 4 }"#).unwrap();
        assert_eq!(config.frame_budget_ms, 4);
        assert_eq!(config.event_prefix, "on");
        assert_eq!(config.yield_threshold(), Duration::from_millis(1));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = RuntimeConfig::from_json("{ frame_budget_ms: }").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
