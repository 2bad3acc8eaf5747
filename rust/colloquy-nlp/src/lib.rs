//! # Colloquy NLP: conversational translation into structured queries
//!
//! Turns what a user types ("Show all companies located in Minsk.") into a
//! [`colloquy_query::StructuredQuery`], and keeps amending that query as the
//! conversation goes on ("Sort by name. Descending.").
//!
//! ## Core Ideas
//!
//! - **Templates carry rules**: every phrase template the grammar knows has a
//!   declarative rule saying whether it starts a command or amends the current
//!   one, and where in the tree its inputs live.
//! - **Paths address the tree**: rules point at nodes with a small path
//!   language (`H/npObject/C/ppPlace/H/1`) parsed once at load time.
//! - **Meaning before spelling**: nouns resolve to schema entities and
//!   attributes by semantic category first, and by lexeme or synonym second.
//! - **State is a value**: each sentence yields a new [`TranslatorState`];
//!   older states stay valid for undo.
//!
//! ## Architecture
//!
//! ```text
//! Text → Tokenize → Disambiguate → Match template (grammar)
//!   → Look up rule → Mutate query (paths + resolver)
//!     → Next state
//! ```
//!
//! Morphology and grammar are boundaries ([`Morphology`], [`Grammar`]);
//! [`Lexicon`] and [`SentenceTokenizer`] are table-driven reference
//! implementations of the first and of the tokenizer.

pub mod command;
pub mod config;
pub mod disambiguate;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod morphology;
pub mod mutator;
pub mod path;
pub mod phrase;
pub mod resolver;
pub mod state;
pub mod template;
pub mod tokenizer;

pub use command::{Action, Command};
pub use config::{ConfigError, ErrorPolicy, TranslatorConfig};
pub use disambiguate::Disambiguator;
pub use driver::Translator;
pub use error::{TranslateError, TranslateResult};
pub use grammar::{Grammar, ParseResult};
pub use morphology::{Lexicon, Morphology, Reading};
pub use mutator::QueryMutator;
pub use path::{Path, PathError, find};
pub use phrase::{NodeRef, PartOfSpeech, Phrase, PhraseNode, TemplateId, Token, TokenKind, Word};
pub use resolver::SemanticResolver;
pub use state::{ForwardHints, TranslatorState};
pub use template::{
    ActionSelector, Condition, Context, EntityLocator, OrderRule, PredicateKind, TemplateRegistry,
    TemplateRule, WhereSpec,
};
pub use tokenizer::{Sentence, SentenceTokenizer, Tokenizer};
