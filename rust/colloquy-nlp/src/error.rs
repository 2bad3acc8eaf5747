//! Error types for translation.

use thiserror::Error;

use crate::command::Action;

/// A sentence-level translation failure.
///
/// Every variant aborts the sentence it was raised for. The state the caller
/// passed in is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("no node of the expected shape at path '{path}'")]
    InvalidPhraseStructure { path: String },

    #[error("no phrase template matches sentence {sentence:?}")]
    UnknownPhrase { sentence: String },

    #[error("'{noun}' does not name a known entity")]
    UnknownEntity { noun: String },

    #[error("'{noun}' does not name a known attribute")]
    UnknownAttr { noun: String },

    #[error("no action selector of template '{template}' matched")]
    UnknownAction { template: String },

    #[error("operation requires a query command, found {action}")]
    UnsupportedCommandType { action: Action },

    #[error("'{operation}' requires a current command")]
    NoContext { operation: String },
}

/// Result type for translation operations.
pub type TranslateResult<T> = Result<T, TranslateError>;
