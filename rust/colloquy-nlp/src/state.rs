//! Conversation state.
//!
//! A [`TranslatorState`] is a value. Every processed sentence produces a new
//! one and leaves its input intact, so a caller can keep older states around
//! for undo or compare states directly in tests.

use std::sync::Arc;

use colloquy_query::{Direction, Schema, StructuredQuery};
use serde::{Deserialize, Serialize};

use crate::command::{Action, Command};
use crate::error::{TranslateError, TranslateResult};

/// Information given before the thing it modifies exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardHints {
    /// A direction said before any sort attribute was.
    pub pending_sort_direction: Option<Direction>,
}

/// The state of one conversation over one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorState {
    schema: Arc<Schema>,
    command: Option<Arc<Command>>,
    hints: ForwardHints,
}

impl TranslatorState {
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            command: None,
            hints: ForwardHints::default(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// A state over the same schema with no command and no hints.
    pub fn clear(&self) -> Self {
        Self::new(Arc::clone(&self.schema))
    }

    pub fn command(&self) -> Option<&Command> {
        self.command.as_deref()
    }

    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }

    /// Whether there is a command that at least one sentence contributed to.
    pub fn is_valid(&self) -> bool {
        self.command().is_some_and(|c| !c.utterances.is_empty())
    }

    pub fn utterances(&self) -> &[String] {
        self.command()
            .map(|c| c.utterances.as_slice())
            .unwrap_or_default()
    }

    pub fn hints(&self) -> ForwardHints {
        self.hints
    }

    /// The current query, for callers that paraphrase or render it.
    pub fn query(&self) -> TranslateResult<&StructuredQuery> {
        let command = self.command().ok_or_else(|| TranslateError::NoContext {
            operation: "query".to_string(),
        })?;
        match command.action {
            Action::Query => Ok(&command.query),
            action => Err(TranslateError::UnsupportedCommandType { action }),
        }
    }

    /// The successor state holding `command` and `hints`.
    pub(crate) fn evolve(&self, command: Option<Command>, hints: ForwardHints) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            command: command.map(Arc::new),
            hints,
        }
    }
}
