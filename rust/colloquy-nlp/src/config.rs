//! Translator configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("malformed configuration: {message}")]
    Malformed { message: String },

    #[error("template '{template}' starts a new command but has no action selectors")]
    MissingActions { template: String },

    #[error("template '{template}' starts a new command but has no entity locator")]
    MissingEntity { template: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed {
            message: err.to_string(),
        }
    }
}

/// What happens to the rest of the text when one sentence fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Return the first error. The caller keeps its previous state.
    #[default]
    Abort,
    /// Drop the failing sentence and continue with the next one.
    Skip,
}

/// Settings for [`crate::driver::Translator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub error_policy: ErrorPolicy,
    /// Fold "X, Y and Z" lists into one word with coordinated peers.
    pub coordinate_terms: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Abort,
            coordinate_terms: true,
        }
    }
}

impl TranslatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
