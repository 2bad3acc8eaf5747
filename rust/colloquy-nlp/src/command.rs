//! Commands: what the conversation has asked for so far.
//!
//! A [`Command`] pairs an [`Action`] with the query it acts on. Only
//! `Query` commands can be handed to a renderer; the translator still builds
//! and amends the others.

use std::fmt;

use colloquy_query::StructuredQuery;
use serde::{Deserialize, Serialize};

/// What a command does with the rows its query selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Query,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Query => write!(f, "query"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// The running result of a conversation: an action, the query it acts on and
/// the sentences that shaped it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub action: Action,
    pub query: StructuredQuery,
    /// Echo of every contributing sentence, oldest first. Never re-parsed.
    #[serde(default)]
    pub utterances: Vec<String>,
}

impl Command {
    pub fn new(action: Action, query: StructuredQuery) -> Self {
        Self {
            action,
            query,
            utterances: Vec::new(),
        }
    }
}
