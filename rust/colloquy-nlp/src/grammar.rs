//! The grammar boundary.
//!
//! The translator does not define a grammar. It asks a [`Grammar`] to match
//! the lexemes of a sentence against one template at a time, and counts the
//! match only when nothing is left over.

use crate::phrase::{Phrase, PhraseNode, TemplateId};

/// Outcome of matching lexemes against one template.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    /// `phrase` matched, with `rest` lexemes left unconsumed.
    Success { phrase: Phrase, rest: usize },
    Failure,
}

impl ParseResult {
    /// The phrase, if it consumed every lexeme.
    pub fn complete(self) -> Option<Phrase> {
        match self {
            ParseResult::Success { phrase, rest: 0 } => Some(phrase),
            _ => None,
        }
    }
}

pub trait Grammar {
    fn parse(&self, lexemes: &[PhraseNode], template: &TemplateId) -> ParseResult;
}

impl<F> Grammar for F
where
    F: Fn(&[PhraseNode], &TemplateId) -> ParseResult,
{
    fn parse(&self, lexemes: &[PhraseNode], template: &TemplateId) -> ParseResult {
        self(lexemes, template)
    }
}
