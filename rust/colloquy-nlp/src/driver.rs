//! Conversation driver.
//!
//! [`Translator`] is the entry point: it takes the current state and a piece
//! of text and returns the next state. Each sentence is tokenized,
//! disambiguated and matched against the registry's templates in declaration
//! order. The first template that consumes the whole sentence wins, and its
//! rule is applied. The state each sentence produces feeds the next, so
//! "Show companies. Sort by name. Descending." builds one query.

use crate::config::{ErrorPolicy, TranslatorConfig};
use crate::disambiguate::Disambiguator;
use crate::error::{TranslateError, TranslateResult};
use crate::grammar::Grammar;
use crate::morphology::Morphology;
use crate::mutator::QueryMutator;
use crate::phrase::Phrase;
use crate::state::TranslatorState;
use crate::template::{TemplateRegistry, TemplateRule};
use crate::tokenizer::{Sentence, SentenceTokenizer, Tokenizer};

/// Translates text into commands against a [`TranslatorState`].
pub struct Translator<M, G, T = SentenceTokenizer> {
    registry: TemplateRegistry,
    morphology: M,
    grammar: G,
    tokenizer: T,
    config: TranslatorConfig,
}

impl<M, G> Translator<M, G>
where
    M: Morphology,
    G: Grammar,
{
    pub fn new(registry: TemplateRegistry, morphology: M, grammar: G) -> Self {
        Self {
            registry,
            morphology,
            grammar,
            tokenizer: SentenceTokenizer,
            config: TranslatorConfig::default(),
        }
    }
}

impl<M, G, T> Translator<M, G, T>
where
    M: Morphology,
    G: Grammar,
    T: Tokenizer,
{
    /// Replace the tokenizer.
    pub fn with_tokenizer<U: Tokenizer>(self, tokenizer: U) -> Translator<M, G, U> {
        Translator {
            registry: self.registry,
            morphology: self.morphology,
            grammar: self.grammar,
            tokenizer,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: TranslatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Process every sentence of `text`, starting from `state`.
    ///
    /// Under [`ErrorPolicy::Abort`] the first failing sentence ends the call
    /// and `state` stays current for the caller. Under [`ErrorPolicy::Skip`]
    /// failing sentences are logged and dropped.
    pub fn process_text(
        &self,
        state: &TranslatorState,
        text: &str,
    ) -> TranslateResult<TranslatorState> {
        let sentences = self.tokenizer.tokenize(text);
        tracing::debug!(sentences = sentences.len(), "processing text");

        let mut current = state.clone();
        for sentence in &sentences {
            match self.process_sentence(&current, sentence) {
                Ok(next) => current = next,
                Err(err) => match self.config.error_policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Skip => {
                        tracing::warn!(sentence = %sentence.text, error = %err, "skipping sentence");
                    }
                },
            }
        }
        Ok(current)
    }

    /// Process one sentence.
    pub fn process_sentence(
        &self,
        state: &TranslatorState,
        sentence: &Sentence,
    ) -> TranslateResult<TranslatorState> {
        let (phrase, rule) = self.match_template(sentence).ok_or_else(|| {
            TranslateError::UnknownPhrase {
                sentence: sentence.text.clone(),
            }
        })?;
        QueryMutator::new(&self.registry, &self.morphology).apply(
            state,
            &phrase,
            rule,
            Some(&sentence.text),
        )
    }

    /// The first template that parses the whole sentence, with its rule.
    fn match_template(&self, sentence: &Sentence) -> Option<(Phrase, &TemplateRule)> {
        let lexemes = Disambiguator::new(&self.morphology)
            .coordinate(self.config.coordinate_terms)
            .disambiguate(sentence);

        self.registry.templates().find_map(|template| {
            let phrase = self.grammar.parse(&lexemes, template).complete()?;
            let rule = self.registry.rule(template.as_str())?;
            tracing::debug!(%template, sentence = %sentence.text, "template matched");
            Some((phrase, rule))
        })
    }
}
