//! # Traversal Configuration
//!
//! What to read and how to batch it.
//!
//! ```rust
//! use chunkwalk::{TailPolicy, TraversalConfig};
//!
//! let config = TraversalConfig::default()
//!     .with_variables(["temperature", "salinity"])
//!     .with_block_size(4096)
//!     .with_bounds(0, 100_000)
//!     .with_tail(TailPolicy::Flush);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

/// Variables read when the caller does not name any
pub const DEFAULT_VARIABLES: [&str; 4] = ["temperature", "conductivity", "salinity", "pressure"];

/// What happens to a partially filled buffer when the traversal ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Emit one final record per variable carrying the leftover elements
    #[default]
    Flush,

    /// Discard leftovers; only full buffers are ever emitted
    Drop,
}

/// Configuration for a [`Traversal`](crate::engine::Traversal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Local dataset names to look for, in emission order
    pub variable_names: Vec<String>,

    /// Target size of each accumulated buffer, in elements
    ///
    /// Also the per-block element budget. `None` reads each dataset as a
    /// single block and disables accumulation.
    pub concatenate_block_size: Option<usize>,

    /// `(start_index, stop_index)` along the first dimension, stop exclusive
    pub bounds: Option<(usize, usize)>,

    /// Leftover handling at end of stream
    pub tail: TailPolicy,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            variable_names: DEFAULT_VARIABLES.iter().map(|s| s.to_string()).collect(),
            concatenate_block_size: None,
            bounds: None,
            tail: TailPolicy::default(),
        }
    }
}

impl TraversalConfig {
    /// Default variables, no batching
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the variable list; duplicates keep their first position
    pub fn with_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        self.variable_names = out;
        self
    }

    pub fn with_block_size(mut self, size: usize) -> Self {
        self.concatenate_block_size = Some(size);
        self
    }

    /// Restrict the first dimension to `start..stop`
    pub fn with_bounds(mut self, start: usize, stop: usize) -> Self {
        self.bounds = Some((start, stop));
        self
    }

    pub fn with_tail(mut self, tail: TailPolicy) -> Self {
        self.tail = tail;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the engine cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variable_names.is_empty() {
            return Err(ConfigError::NoVariables);
        }
        if self.variable_names.iter().any(|n| n.is_empty() || n.contains('/')) {
            return Err(ConfigError::InvalidValue {
                field: "variable_names".into(),
                message: "names must be non-empty local names without '/'".into(),
            });
        }
        if self.concatenate_block_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "concatenate_block_size".into(),
                message: "must be at least 1".into(),
            });
        }
        if let Some((start, stop)) = self.bounds {
            if start > stop {
                return Err(ConfigError::InvalidValue {
                    field: "bounds".into(),
                    message: format!("start_index {} is past stop_index {}", start, stop),
                });
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no variable names configured")]
    NoVariables,

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_variables() {
        let config = TraversalConfig::default();
        assert_eq!(
            config.variable_names,
            vec!["temperature", "conductivity", "salinity", "pressure"]
        );
        assert!(config.concatenate_block_size.is_none());
        assert_eq!(config.tail, TailPolicy::Flush);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_variables_dedups() {
        let config = TraversalConfig::new().with_variables(["a", "b", "a"]);
        assert_eq!(config.variable_names, vec!["a", "b"]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            TraversalConfig::new().with_variables(Vec::<String>::new()).validate(),
            Err(ConfigError::NoVariables)
        ));
        assert!(TraversalConfig::new().with_block_size(0).validate().is_err());
        assert!(TraversalConfig::new().with_bounds(5, 2).validate().is_err());
        assert!(TraversalConfig::new()
            .with_variables(["grp/temperature"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            TraversalConfig::from_json_str(r#"{"concatenate_block_size": 40, "tail": "drop"}"#)
                .unwrap();
        assert_eq!(config.concatenate_block_size, Some(40));
        assert_eq!(config.tail, TailPolicy::Drop);
        assert_eq!(config.variable_names.len(), 4);
    }

    #[test]
    fn test_from_json_errors() {
        match TraversalConfig::from_json_str("{not json") {
            Err(ConfigError::Parse(e)) => assert!(e.is_syntax()),
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert!(matches!(
            TraversalConfig::from_json_str(r#"{"tail": "sometimes"}"#),
            Err(ConfigError::Parse(ref e)) if e.is_data()
        ));
        assert!(matches!(
            TraversalConfig::from_json_str(r#"{"bounds": [9, 3]}"#),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
