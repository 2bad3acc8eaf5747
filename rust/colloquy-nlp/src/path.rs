//! Path navigator: a small addressing language over phrase trees.
//!
//! Translation rules point at the nodes they need with `/`-separated paths:
//!
//! ```text
//! path       = segment ('/' segment)*
//! segment    = head selector?
//!            | complement template
//!            | adjunct template
//! head       = 'H' | 'head'
//! complement = 'C' | 'complement'
//! adjunct    = 'A' | 'adjunct'
//! selector   = index | template
//! ```
//!
//! `H` follows the head of a phrase: the first head item by default, the item
//! at `index`, or the nested phrase whose template is `template`. `C` and `A`
//! follow the complement or adjunct with the given template.
//!
//! Paths are parsed once when a rule is loaded. Resolution is structural and
//! total: any segment that does not apply to the node at hand yields `None`.
//!
//! ```
//! use colloquy_nlp::path::{find, Path};
//! use colloquy_nlp::phrase::{PartOfSpeech, Phrase, PhraseNode, Word};
//!
//! let tree: PhraseNode = Phrase::new("vpShow")
//!     .with_head(Word::new(PartOfSpeech::Verb, "show", "show"))
//!     .with_head(Phrase::new("npObject").with_head(Word::new(
//!         PartOfSpeech::Noun,
//!         "company",
//!         "companies",
//!     )))
//!     .into();
//!
//! let noun = find(tree.view(), "H/npObject/H").and_then(|n| n.as_word());
//! assert_eq!(noun.map(|w| w.lemma.as_str()), Some("company"));
//! assert!(find(tree.view(), "C/ppPlace").is_none());
//! assert!("/H".parse::<Path>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::phrase::{NodeRef, Phrase, TemplateId};

/// Errors raised while parsing a path string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("empty segment in path {path:?}")]
    EmptySegment { path: String },

    #[error("expected a template id after {keyword:?} in path {path:?}")]
    MissingTemplate { keyword: String, path: String },

    #[error("unexpected segment {segment:?} in path {path:?}")]
    UnexpectedSegment { segment: String, path: String },
}

/// Which head item an `H` segment follows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeadSelector {
    Index(usize),
    Template(TemplateId),
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Head(HeadSelector),
    Complement(TemplateId),
    Adjunct(TemplateId),
}

impl Segment {
    /// Resolve this segment against `node`. Only phrases have children.
    fn step<'a>(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        let phrase = node.as_phrase()?;
        match self {
            Segment::Head(HeadSelector::Index(index)) => phrase.head_at(*index).map(NodeRef::from),
            Segment::Head(HeadSelector::Template(id)) => {
                phrase.head_by_template(id.as_str()).map(NodeRef::from)
            }
            Segment::Complement(id) => phrase.complement(id.as_str()).map(NodeRef::from),
            Segment::Adjunct(id) => phrase.adjunct(id.as_str()).map(NodeRef::from),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Head(HeadSelector::Index(0)) => write!(f, "H"),
            Segment::Head(HeadSelector::Index(index)) => write!(f, "H/{index}"),
            Segment::Head(HeadSelector::Template(id)) => write!(f, "H/{id}"),
            Segment::Complement(id) => write!(f, "C/{id}"),
            Segment::Adjunct(id) => write!(f, "A/{id}"),
        }
    }
}

/// A parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolve the path against `root`.
    pub fn find<'a>(&self, root: impl Into<NodeRef<'a>>) -> Option<NodeRef<'a>> {
        self.find_with_parent(root).map(|(_, node)| node)
    }

    /// Resolve the path against `root`, also returning the phrase the final
    /// segment was taken from.
    pub fn find_with_parent<'a>(
        &self,
        root: impl Into<NodeRef<'a>>,
    ) -> Option<(&'a Phrase, NodeRef<'a>)> {
        let mut node = root.into();
        let mut parent = None;
        for segment in &self.segments {
            parent = Some(node.as_phrase()?);
            node = segment.step(node)?;
        }
        parent.map(|p| (p, node))
    }
}

/// A token-stream parser over path segments, in the style of a recursive
/// descent parser with a single token of lookahead.
struct Parser<'s> {
    source: &'s str,
    parts: Vec<&'s str>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            parts: source.split('/').collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'s str> {
        self.parts.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'s str> {
        let part = self.peek();
        if part.is_some() {
            self.pos += 1;
        }
        part
    }

    fn template(&mut self, keyword: &str) -> Result<TemplateId, PathError> {
        match self.advance() {
            Some(id) if !is_keyword(id) => Ok(TemplateId::new(id)),
            _ => Err(PathError::MissingTemplate {
                keyword: keyword.to_string(),
                path: self.source.to_string(),
            }),
        }
    }

    fn head_selector(&mut self) -> HeadSelector {
        match self.peek() {
            Some(part) if !is_keyword(part) => {
                self.advance();
                match part.parse::<usize>() {
                    Ok(index) => HeadSelector::Index(index),
                    Err(_) => HeadSelector::Template(TemplateId::new(part)),
                }
            }
            _ => HeadSelector::Index(0),
        }
    }

    fn segment(&mut self, part: &'s str) -> Result<Segment, PathError> {
        match part {
            "H" | "head" => Ok(Segment::Head(self.head_selector())),
            "C" | "complement" => Ok(Segment::Complement(self.template(part)?)),
            "A" | "adjunct" => Ok(Segment::Adjunct(self.template(part)?)),
            other => Err(PathError::UnexpectedSegment {
                segment: other.to_string(),
                path: self.source.to_string(),
            }),
        }
    }

    fn parse(mut self) -> Result<Path, PathError> {
        if self.source.is_empty() {
            return Err(PathError::Empty);
        }
        if self.parts.iter().any(|p| p.is_empty()) {
            return Err(PathError::EmptySegment {
                path: self.source.to_string(),
            });
        }

        let mut segments = Vec::new();
        while let Some(part) = self.advance() {
            segments.push(self.segment(part)?);
        }
        Ok(Path { segments })
    }
}

fn is_keyword(part: &str) -> bool {
    matches!(part, "H" | "head" | "C" | "complement" | "A" | "adjunct")
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Parser::new(source).parse()
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        source.parse()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        source.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolve a path string against `root`. Malformed paths resolve to `None`.
pub fn find<'a>(root: impl Into<NodeRef<'a>>, path: &str) -> Option<NodeRef<'a>> {
    path.parse::<Path>().ok()?.find(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phrase::{PartOfSpeech, PhraseNode, Token, TokenKind, Word};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;
    use proptest::prelude::*;

    fn show_companies_in_minsk() -> PhraseNode {
        Phrase::new("vpShow")
            .with_head(Word::new(PartOfSpeech::Verb, "show", "show"))
            .with_head(
                Phrase::new("npObject")
                    .with_head(Word::new(PartOfSpeech::Noun, "company", "companies"))
                    .with_adjunct(
                        Phrase::new("apAll").with_head(Word::new(PartOfSpeech::Pronoun, "all", "all")),
                    )
                    .with_complement(
                        Phrase::new("ppPlace")
                            .with_head(Word::new(PartOfSpeech::Preposition, "in", "in"))
                            .with_head(Word::new(PartOfSpeech::Noun, "Minsk", "Minsk")),
                    ),
            )
            .with_head(Token::new(TokenKind::Punctuation, "."))
            .into()
    }

    fn lemma(node: Option<NodeRef<'_>>) -> Option<&str> {
        node.and_then(|n| n.as_word()).map(|w| w.lemma.as_str())
    }

    #[test]
    fn parses_segments() -> TestResult {
        let path: Path = "H/npObject/C/ppPlace/H/1".parse()?;
        assert_eq!(
            path.segments(),
            &[
                Segment::Head(HeadSelector::Template("npObject".into())),
                Segment::Complement("ppPlace".into()),
                Segment::Head(HeadSelector::Index(1)),
            ]
        );
        Ok(())
    }

    #[test]
    fn accepts_long_keywords() -> TestResult {
        let short: Path = "H/1/C/ppPlace".parse()?;
        let long: Path = "head/1/complement/ppPlace".parse()?;
        assert_eq!(short, long);
        Ok(())
    }

    #[test]
    fn head_defaults_to_first_item() {
        let tree = show_companies_in_minsk();
        assert_eq!(lemma(find(&tree, "H")), Some("show"));
        assert_eq!(lemma(find(&tree, "H/0")), Some("show"));
    }

    #[test]
    fn follows_heads_complements_and_adjuncts() {
        let tree = show_companies_in_minsk();
        assert_eq!(lemma(find(&tree, "H/1/H")), Some("company"));
        assert_eq!(lemma(find(&tree, "H/npObject/C/ppPlace/H/1")), Some("Minsk"));
        assert_eq!(lemma(find(&tree, "H/npObject/A/apAll/H")), Some("all"));
        assert_eq!(
            find(&tree, "H/2").and_then(|n| n.as_token()).map(|t| t.text.as_str()),
            Some(".")
        );
    }

    #[test]
    fn unresolvable_segments_yield_none() {
        let tree = show_companies_in_minsk();
        assert!(find(&tree, "C/ppPlace").is_none());
        assert!(find(&tree, "H/7").is_none());
        assert!(find(&tree, "H/npSubject").is_none());
        // A word has no children.
        assert!(find(&tree, "H/0/H").is_none());
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert_eq!("".parse::<Path>(), Err(PathError::Empty));
        assert!(matches!("/H".parse::<Path>(), Err(PathError::EmptySegment { .. })));
        assert!(matches!("H//C".parse::<Path>(), Err(PathError::EmptySegment { .. })));
        assert!(matches!("C".parse::<Path>(), Err(PathError::MissingTemplate { .. })));
        assert!(matches!("C/H".parse::<Path>(), Err(PathError::MissingTemplate { .. })));
        assert!(matches!("X".parse::<Path>(), Err(PathError::UnexpectedSegment { .. })));

        let tree = show_companies_in_minsk();
        assert!(find(&tree, "").is_none());
        assert!(find(&tree, "/H").is_none());
    }

    #[test]
    fn find_with_parent_reports_the_owning_phrase() -> TestResult {
        let tree = show_companies_in_minsk();
        let path: Path = "H/npObject/H".parse()?;
        let (parent, node) = path.find_with_parent(&tree).ok_or("path did not resolve")?;
        assert_eq!(parent.template.as_str(), "npObject");
        assert_eq!(lemma(Some(node)), Some("company"));
        Ok(())
    }

    #[test]
    fn displays_and_serializes_canonically() -> TestResult {
        let path: Path = "head/0/complement/ppPlace/H/1".parse()?;
        assert_eq!(path.to_string(), "H/C/ppPlace/H/1");
        let json = serde_json::to_string(&path)?;
        assert_eq!(json, "\"H/C/ppPlace/H/1\"");
        let back: Path = serde_json::from_str(&json)?;
        assert_eq!(back, path);
        Ok(())
    }

    proptest! {
        #[test]
        fn resolution_is_deterministic(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("H".to_string()),
                    Just("C".to_string()),
                    Just("A".to_string()),
                    Just("npObject".to_string()),
                    Just("ppPlace".to_string()),
                    Just("apAll".to_string()),
                    (0usize..4).prop_map(|i| i.to_string()),
                ],
                0..6,
            )
        ) {
            let tree = show_companies_in_minsk();
            let path = parts.join("/");
            let first = find(&tree, &path);
            let second = find(&tree, &path);
            prop_assert_eq!(first, second);
        }
    }
}
