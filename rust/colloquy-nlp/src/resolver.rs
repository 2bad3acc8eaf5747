//! Semantic resolution of nouns to schema entities and attributes.
//!
//! Resolution runs two passes over the candidates in declaration order:
//!
//! 1. **Category.** The first candidate tagged with one of the word's
//!    meanings wins outright.
//! 2. **Lexical.** Each caption of each candidate is split on `,` and analyzed.
//!    A candidate matches when a caption reads as the same lexeme as the word,
//!    or when the two share a meaning.
//!
//! The lexical pass analyzes captions on every call, so callers resolve a
//! noun once and keep the result.
//!
//! Identifier and quoted-literal tokens bypass both passes and resolve by
//! exact schema name. Attribute names are matched upper-cased.

use colloquy_query::{Attribute, Entity, Schema, SemanticCategory};

use crate::morphology::Morphology;
use crate::phrase::{NodeRef, Token, TokenKind, Word};

/// A schema element the resolver can choose.
trait Candidate {
    fn name(&self) -> &str;
    fn caption(&self) -> &[String];
    fn categories(&self) -> &[SemanticCategory];
}

impl Candidate for Entity {
    fn name(&self) -> &str {
        &self.name
    }

    fn caption(&self) -> &[String] {
        &self.caption
    }

    fn categories(&self) -> &[SemanticCategory] {
        &self.categories
    }
}

impl Candidate for Attribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn caption(&self) -> &[String] {
        &self.caption
    }

    fn categories(&self) -> &[SemanticCategory] {
        &self.categories
    }
}

/// Resolves words and tokens against a schema.
pub struct SemanticResolver<'a, M> {
    schema: &'a Schema,
    morphology: &'a M,
}

impl<'a, M: Morphology> SemanticResolver<'a, M> {
    pub fn new(schema: &'a Schema, morphology: &'a M) -> Self {
        Self { schema, morphology }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn resolve_entity(&self, word: &Word) -> Option<&'a Entity> {
        self.choose(self.schema.entities(), word)
    }

    pub fn resolve_attribute<'e>(&self, entity: &'e Entity, word: &Word) -> Option<&'e Attribute> {
        self.choose(entity.attributes(), word)
    }

    /// Resolve an identifier or quoted literal by exact entity name.
    pub fn resolve_entity_token(&self, token: &Token) -> Option<&'a Entity> {
        by_name(token).and_then(|name| self.schema.entity(name))
    }

    /// Resolve an identifier or quoted literal by upper-cased attribute name.
    pub fn resolve_attribute_token<'e>(
        &self,
        entity: &'e Entity,
        token: &Token,
    ) -> Option<&'e Attribute> {
        by_name(token).and_then(|name| entity.attribute(&name.to_uppercase()))
    }

    /// Resolve whatever kind of node a path led to as an entity.
    pub fn resolve_entity_node(&self, node: NodeRef<'_>) -> Option<&'a Entity> {
        match node {
            NodeRef::Word(word) => self.resolve_entity(word),
            NodeRef::Token(token) => self.resolve_entity_token(token),
            NodeRef::Phrase(_) | NodeRef::Empty => None,
        }
    }

    /// Resolve whatever kind of node a path led to as an attribute of `entity`.
    pub fn resolve_attribute_node<'e>(
        &self,
        entity: &'e Entity,
        node: NodeRef<'_>,
    ) -> Option<&'e Attribute> {
        match node {
            NodeRef::Word(word) => self.resolve_attribute(entity, word),
            NodeRef::Token(token) => self.resolve_attribute_token(entity, token),
            NodeRef::Phrase(_) | NodeRef::Empty => None,
        }
    }

    fn choose<'c, C, I>(&self, candidates: I, word: &Word) -> Option<&'c C>
    where
        C: Candidate + 'c,
        I: Iterator<Item = &'c C> + Clone,
    {
        if let Some(found) = candidates
            .clone()
            .find(|c| word.meanings.iter().any(|m| c.categories().contains(m)))
        {
            tracing::trace!(word = %word.lemma, candidate = found.name(), "resolved by category");
            return Some(found);
        }

        let found = candidates.into_iter().find(|c| self.reads_as(*c, word));
        if let Some(found) = found {
            tracing::trace!(word = %word.lemma, candidate = found.name(), "resolved lexically");
        }
        found
    }

    /// Whether any caption of `candidate` reads as `word` or one of its synonyms.
    fn reads_as<C: Candidate>(&self, candidate: &C, word: &Word) -> bool {
        let captions = if candidate.caption().is_empty() {
            vec![candidate.name()]
        } else {
            candidate
                .caption()
                .iter()
                .flat_map(|c| c.split(','))
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect()
        };

        captions.into_iter().any(|caption| {
            self.morphology
                .analyze(caption)
                .first()
                .map(|reading| reading.to_word(caption))
                .is_some_and(|reference| {
                    reference.same_lexeme(word) || reference.shares_meaning(&word.meanings)
                })
        })
    }
}

fn by_name(token: &Token) -> Option<&str> {
    match token.kind {
        TokenKind::Identifier | TokenKind::QuotedLiteral => Some(token.value()),
        _ => None,
    }
}
