//! Sequencer configuration
//!
//! Loaded once at startup (JSON or defaults) and immutable afterwards.
//! Every field has a default, so an empty object is a valid config.

use serde::{Deserialize, Serialize};

use super::errors::{SequenceError, SequenceResult};

/// Configuration for the sequencing consumer and its transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Entries the transport holds before producers block (default: 1024)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Reject fresh entries whose txid does not exceed the previous one
    /// (default: true)
    #[serde(default = "default_enforce_txid_order")]
    pub enforce_txid_order: bool,

    /// Emit per-entry events on the console logger (default: false)
    #[serde(default)]
    pub log_events: bool,
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_enforce_txid_order() -> bool {
    true
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            enforce_txid_order: default_enforce_txid_order(),
            log_events: false,
        }
    }
}

impl SequencerConfig {
    /// Create a config with the given transport capacity
    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> SequenceResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SequenceError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SequenceResult<()> {
        if self.queue_capacity == 0 {
            return Err(SequenceError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequencerConfig::default();
        assert_eq!(config.queue_capacity, 1024);
        assert!(config.enforce_txid_order);
        assert!(!config.log_events);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        assert_eq!(SequencerConfig::from_json("{}").unwrap(), SequencerConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = SequencerConfig::from_json(r#"{"queue_capacity": 8, "log_events": true}"#).unwrap();
        assert_eq!(config.queue_capacity, 8);
        assert!(config.log_events);
        assert!(config.enforce_txid_order);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = SequencerConfig::from_json(r#"{"queue_capacity": 0}"#).unwrap_err();
        assert_eq!(err.code(), "AERO_SEQ_INVALID_CONFIG");
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            SequencerConfig::from_json("not json"),
            Err(SequenceError::InvalidConfig(_))
        ));
    }
}
