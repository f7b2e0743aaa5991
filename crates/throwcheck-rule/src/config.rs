//! Rule configuration.
//!
//! Every field has a default matching the conventional `@Throws` marker, so
//! an empty JSON object (or no config file at all) yields a working rule.
//!
//! ```json
//! {
//!     "marker_name": "Throws",
//!     "marker_library": "package:throws/throws.dart",
//!     "broad_kinds": ["Object", "dynamic", "Exception", "Error"],
//!     "error_continuations": ["catchError", "onError", "handleError"],
//!     "two_branch_continuations": {"then": "onError"},
//!     "severity": "warning"
//! }
//! ```

use crate::error::Severity;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunable parts of the rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    /// When false the rule reports nothing
    pub enabled: bool,

    /// Simple name of the failure-obligation annotation
    pub marker_name: String,

    /// Library declaring the marker. When set and the host resolved the
    /// annotation's library, both must match; otherwise names alone decide.
    pub marker_library: Option<String>,

    /// Handler types that catch any failure
    pub broad_kinds: Vec<String>,

    /// Members that attach an error continuation to their receiver
    pub error_continuations: Vec<String>,

    /// Members that discharge the obligation only when given the named
    /// error-branch argument (`then(onValue, onError: ...)`)
    pub two_branch_continuations: IndexMap<String, String>,

    /// Severity of reported findings
    pub severity: Severity,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_name: "Throws".to_string(),
            marker_library: None,
            broad_kinds: ["Object", "dynamic", "Exception", "Error"]
                .into_iter()
                .map(String::from)
                .collect(),
            error_continuations: ["catchError", "onError", "handleError"]
                .into_iter()
                .map(String::from)
                .collect(),
            two_branch_continuations: IndexMap::from([("then".to_string(), "onError".to_string())]),
            severity: Severity::Warning,
        }
    }
}

impl RuleConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RuleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Rejects configurations the rule cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_name.trim().is_empty() {
            return Err(ConfigError::Invalid("marker_name must not be empty".to_string()));
        }
        if let Some(member) = self
            .error_continuations
            .iter()
            .chain(self.two_branch_continuations.keys())
            .find(|m| m.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "continuation member names must not be empty (got {:?})",
                member
            )));
        }
        Ok(())
    }

    /// Returns true if `name` is a configured broad handler kind.
    pub fn is_broad_kind(&self, name: &str) -> bool {
        self.broad_kinds.iter().any(|k| k == name)
    }
}
