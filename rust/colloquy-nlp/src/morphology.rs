//! Morphology boundary and an in-memory lexicon.
//!
//! The translator never inspects word forms itself. It asks a [`Morphology`]
//! for the readings of a surface form and works with lemmas, parts of speech
//! and meanings from then on. [`Lexicon`] is a table-driven implementation
//! loaded from JSON:
//!
//! ```json
//! {
//!   "companies": [{ "lemma": "company", "pos": "noun", "meanings": ["Organization"] }],
//!   "minsk": [{ "lemma": "Minsk", "pos": "noun", "meanings": ["Location"] }]
//! }
//! ```

use colloquy_query::SemanticCategory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::phrase::{PartOfSpeech, Word};

/// One candidate analysis of a surface form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub lemma: String,
    pub pos: PartOfSpeech,
    #[serde(default)]
    pub meanings: Vec<SemanticCategory>,
}

impl Reading {
    pub fn new(pos: PartOfSpeech, lemma: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            pos,
            meanings: Vec::new(),
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<SemanticCategory>) -> Self {
        self.meanings.push(meaning.into());
        self
    }

    /// The word this reading makes of `surface`.
    pub fn to_word(&self, surface: impl Into<String>) -> Word {
        Word {
            pos: self.pos,
            lemma: self.lemma.clone(),
            meanings: self.meanings.clone(),
            surface: surface.into(),
            coordinated: Vec::new(),
        }
    }
}

/// A morphological analyzer.
pub trait Morphology {
    /// Candidate readings of `surface`, most likely first. Unknown forms
    /// have none.
    fn analyze(&self, surface: &str) -> Vec<Reading>;
}

impl<T: Morphology + ?Sized> Morphology for &T {
    fn analyze(&self, surface: &str) -> Vec<Reading> {
        (**self).analyze(surface)
    }
}

/// Readings keyed by lowercased surface form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicon {
    entries: IndexMap<String, Vec<Reading>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: IndexMap<String, Vec<Reading>> = serde_json::from_str(json)?;
        let mut lexicon = Self::new();
        for (surface, readings) in raw {
            for reading in readings {
                lexicon.insert(&surface, reading);
            }
        }
        Ok(lexicon)
    }

    /// Add a reading for `surface`, after any already known.
    pub fn insert(&mut self, surface: &str, reading: Reading) {
        self.entries
            .entry(surface.to_lowercase())
            .or_default()
            .push(reading);
    }

    pub fn with(mut self, surface: &str, reading: Reading) -> Self {
        self.insert(surface, reading);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Morphology for Lexicon {
    fn analyze(&self, surface: &str) -> Vec<Reading> {
        self.entries
            .get(&surface.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}
