//! Phrase trees: the parsed shape of one sentence.
//!
//! A tree is produced by a [`crate::grammar::Grammar`] and is read-only to the
//! translator. Every node is one of four kinds:
//!
//! - [`Word`]: a word with a morphological reading and, for coordinated lists
//!   like "Minsk, Pinsk and Brest", the peers and separators that follow it
//! - [`Token`]: punctuation, identifiers, quoted literals and numerals
//! - [`Phrase`]: a matched template with its head, complements and adjuncts
//! - `Empty`: an optional slot that matched nothing
//!
//! ```
//! use colloquy_nlp::phrase::{PartOfSpeech, Phrase, Word};
//!
//! let tree = Phrase::new("vpShow")
//!     .with_head(Word::new(PartOfSpeech::Verb, "show", "show"))
//!     .with_head(Phrase::new("npObject").with_head(Word::new(
//!         PartOfSpeech::Noun,
//!         "company",
//!         "companies",
//!     )));
//!
//! assert_eq!(tree.to_string(), "show companies");
//! ```

use std::borrow::Borrow;
use std::fmt;

use colloquy_query::SemanticCategory;
use serde::{Deserialize, Serialize};

/// Identifier of a phrase template, and the key of its translation rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for TemplateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lexical category of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Participle,
    Preposition,
    Conjunction,
    Pronoun,
    Numeral,
    Particle,
}

/// A word with the reading the disambiguator settled on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub pos: PartOfSpeech,
    /// Dictionary form; together with `pos` it identifies the lexeme.
    pub lemma: String,
    #[serde(default)]
    pub meanings: Vec<SemanticCategory>,
    /// The form as it appeared in the sentence.
    pub surface: String,
    /// Separators and peers of a coordinated list headed by this word.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coordinated: Vec<PhraseNode>,
}

impl Word {
    pub fn new(pos: PartOfSpeech, lemma: impl Into<String>, surface: impl Into<String>) -> Self {
        Self {
            pos,
            lemma: lemma.into(),
            meanings: Vec::new(),
            surface: surface.into(),
            coordinated: Vec::new(),
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<SemanticCategory>) -> Self {
        self.meanings.push(meaning.into());
        self
    }

    pub fn with_coordinated(mut self, node: impl Into<PhraseNode>) -> Self {
        self.coordinated.push(node.into());
        self
    }

    /// Whether both words are readings of the same lexeme.
    pub fn same_lexeme(&self, other: &Word) -> bool {
        self.pos == other.pos && self.lemma.eq_ignore_ascii_case(&other.lemma)
    }

    /// Whether the two words share at least one meaning.
    pub fn shares_meaning(&self, meanings: &[SemanticCategory]) -> bool {
        self.meanings.iter().any(|m| meanings.contains(m))
    }

    fn is_separator(&self) -> bool {
        self.pos == PartOfSpeech::Conjunction
    }
}

/// What kind of non-word token the tokenizer saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A word the morphology had no reading for.
    Word,
    /// A schema identifier such as `GD_COMPANY` or `ADDRESS2`.
    Identifier,
    /// Text in double quotes; `text` keeps the quotes.
    QuotedLiteral,
    Numeral,
    Punctuation,
}

/// A token that is not an analyzed word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// The token's value: quoted literals lose their quotes.
    pub fn value(&self) -> &str {
        match self.kind {
            TokenKind::QuotedLiteral => self
                .text
                .strip_prefix('"')
                .and_then(|t| t.strip_suffix('"'))
                .unwrap_or(&self.text),
            _ => &self.text,
        }
    }

    pub fn is_punctuation(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }
}

/// A matched phrase template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub template: TemplateId,
    /// Head items; addressed by position or, for nested phrases, by template.
    #[serde(default)]
    pub head: Vec<PhraseNode>,
    #[serde(default)]
    pub complements: Vec<Phrase>,
    #[serde(default)]
    pub adjuncts: Vec<Phrase>,
    /// Template of the complement that immediately precedes this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_sibling: Option<TemplateId>,
}

impl Phrase {
    pub fn new(template: impl Into<TemplateId>) -> Self {
        Self {
            template: template.into(),
            head: Vec::new(),
            complements: Vec::new(),
            adjuncts: Vec::new(),
            prev_sibling: None,
        }
    }

    pub fn with_head(mut self, node: impl Into<PhraseNode>) -> Self {
        self.head.push(node.into());
        self
    }

    /// Append a complement, recording the previous complement as its sibling.
    pub fn with_complement(mut self, mut complement: Phrase) -> Self {
        complement.prev_sibling = self.complements.last().map(|c| c.template.clone());
        self.complements.push(complement);
        self
    }

    pub fn with_adjunct(mut self, adjunct: Phrase) -> Self {
        self.adjuncts.push(adjunct);
        self
    }

    pub fn head_at(&self, index: usize) -> Option<&PhraseNode> {
        self.head.get(index)
    }

    /// The head alternative that is a phrase of the given template.
    pub fn head_by_template(&self, template: &str) -> Option<&PhraseNode> {
        self.head
            .iter()
            .find(|node| matches!(node, PhraseNode::Phrase(p) if p.template.as_str() == template))
    }

    pub fn complement(&self, template: &str) -> Option<&Phrase> {
        self.complements.iter().find(|c| c.template.as_str() == template)
    }

    pub fn adjunct(&self, template: &str) -> Option<&Phrase> {
        self.adjuncts.iter().find(|a| a.template.as_str() == template)
    }
}

/// A node of a phrase tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseNode {
    Word(Word),
    Token(Token),
    Phrase(Phrase),
    Empty,
}

impl PhraseNode {
    pub fn as_word(&self) -> Option<&Word> {
        match self {
            PhraseNode::Word(word) => Some(word),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            PhraseNode::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_phrase(&self) -> Option<&Phrase> {
        match self {
            PhraseNode::Phrase(phrase) => Some(phrase),
            _ => None,
        }
    }

    /// Borrow the node as a [`NodeRef`].
    pub fn view(&self) -> NodeRef<'_> {
        NodeRef::from(self)
    }
}

/// A borrowed view of any node, including complements and adjuncts that are
/// stored as bare [`Phrase`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Word(&'a Word),
    Token(&'a Token),
    Phrase(&'a Phrase),
    Empty,
}

impl<'a> NodeRef<'a> {
    pub fn as_word(self) -> Option<&'a Word> {
        match self {
            NodeRef::Word(word) => Some(word),
            _ => None,
        }
    }

    pub fn as_token(self) -> Option<&'a Token> {
        match self {
            NodeRef::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_phrase(self) -> Option<&'a Phrase> {
        match self {
            NodeRef::Phrase(phrase) => Some(phrase),
            _ => None,
        }
    }

    /// Whether the node is a list separator (a comma or a conjunction).
    pub fn is_separator(self) -> bool {
        match self {
            NodeRef::Word(word) => word.is_separator(),
            NodeRef::Token(token) => token.kind == TokenKind::Punctuation,
            NodeRef::Phrase(_) | NodeRef::Empty => false,
        }
    }

    /// The node and its coordinated peers, separators left out.
    pub fn terms(self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Word(word) => std::iter::once(self)
                .chain(
                    word.coordinated
                        .iter()
                        .map(NodeRef::from)
                        .filter(|n| !n.is_separator()),
                )
                .collect(),
            NodeRef::Token(_) => vec![self],
            NodeRef::Phrase(_) | NodeRef::Empty => Vec::new(),
        }
    }
}

impl<'a> From<&'a PhraseNode> for NodeRef<'a> {
    fn from(node: &'a PhraseNode) -> Self {
        match node {
            PhraseNode::Word(word) => NodeRef::Word(word),
            PhraseNode::Token(token) => NodeRef::Token(token),
            PhraseNode::Phrase(phrase) => NodeRef::Phrase(phrase),
            PhraseNode::Empty => NodeRef::Empty,
        }
    }
}

impl<'a> From<&'a Phrase> for NodeRef<'a> {
    fn from(phrase: &'a Phrase) -> Self {
        NodeRef::Phrase(phrase)
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Word(word) => write!(f, "{word}"),
            NodeRef::Token(token) => write!(f, "{}", token.text),
            NodeRef::Phrase(phrase) => write!(f, "{phrase}"),
            NodeRef::Empty => Ok(()),
        }
    }
}

impl From<Word> for PhraseNode {
    fn from(word: Word) -> Self {
        PhraseNode::Word(word)
    }
}

impl From<Token> for PhraseNode {
    fn from(token: Token) -> Self {
        PhraseNode::Token(token)
    }
}

impl From<Phrase> for PhraseNode {
    fn from(phrase: Phrase) -> Self {
        PhraseNode::Phrase(phrase)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.surface)?;
        for node in &self.coordinated {
            if matches!(node, PhraseNode::Token(t) if t.kind == TokenKind::Punctuation) {
                write!(f, "{node}")?;
            } else {
                write!(f, " {node}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .adjuncts
            .iter()
            .map(ToString::to_string)
            .chain(self.head.iter().map(ToString::to_string))
            .chain(self.complements.iter().map(ToString::to_string))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join(" "))
    }
}

impl fmt::Display for PhraseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhraseNode::Word(word) => write!(f, "{word}"),
            PhraseNode::Token(token) => write!(f, "{}", token.text),
            PhraseNode::Phrase(phrase) => write!(f, "{phrase}"),
            PhraseNode::Empty => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minsk_pinsk_brest() -> PhraseNode {
        Word::new(PartOfSpeech::Noun, "Minsk", "Minsk")
            .with_coordinated(Token::new(TokenKind::Punctuation, ","))
            .with_coordinated(Word::new(PartOfSpeech::Noun, "Pinsk", "Pinsk"))
            .with_coordinated(Word::new(PartOfSpeech::Conjunction, "and", "and"))
            .with_coordinated(Word::new(PartOfSpeech::Noun, "Brest", "Brest"))
            .into()
    }

    #[test]
    fn terms_skip_separators() {
        let node = minsk_pinsk_brest();
        let lemmas: Vec<&str> = node
            .view()
            .terms()
            .iter()
            .filter_map(|t| t.as_word())
            .map(|w| w.lemma.as_str())
            .collect();
        assert_eq!(lemmas, vec!["Minsk", "Pinsk", "Brest"]);
    }

    #[test]
    fn coordinated_word_displays_as_written() {
        assert_eq!(minsk_pinsk_brest().to_string(), "Minsk, Pinsk and Brest");
    }

    #[test]
    fn complements_record_their_previous_sibling() {
        let phrase = Phrase::new("vpSort")
            .with_complement(Phrase::new("ppOrderBy"))
            .with_complement(Phrase::new("ppDirection"));
        assert_eq!(phrase.complements[0].prev_sibling, None);
        assert_eq!(
            phrase.complements[1].prev_sibling,
            Some(TemplateId::from("ppOrderBy"))
        );
    }

    #[test]
    fn quoted_literal_value_drops_quotes() {
        let token = Token::new(TokenKind::QuotedLiteral, "\"LLC\"");
        assert_eq!(token.value(), "LLC");
        assert_eq!(Token::new(TokenKind::Numeral, "10").value(), "10");
    }

    #[test]
    fn head_alternatives_are_addressable_by_template() {
        let phrase = Phrase::new("vpShow")
            .with_head(Word::new(PartOfSpeech::Verb, "show", "show"))
            .with_head(Phrase::new("npObject"));
        assert!(phrase.head_by_template("npObject").is_some());
        assert!(phrase.head_by_template("npSubject").is_none());
        assert!(phrase.head_at(0).and_then(PhraseNode::as_word).is_some());
    }
}
