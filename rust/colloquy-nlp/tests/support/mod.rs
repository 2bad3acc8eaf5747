//! Shared fixtures and a small English grammar for integration tests.
//!
//! The grammar knows four sentence shapes:
//!
//! ```text
//! vpShow         = ("show" | "delete") npObject
//! npObject       = apAll? apFirst? noun ppPlace*
//! apAll          = "all"
//! apFirst        = "first" numeral
//! ppPlace        = participle? ("in" | "from") noun
//! vpSort         = "sort" ((ppOrderBy | ppDirection) ","?)*
//! ppOrderBy      = "by" noun
//! ppDirection    = adverb
//! vpNameContains = noun "contains" quoted
//! ```
//!
//! Every sentence may end with terminal punctuation.

#![allow(dead_code)]

use anyhow::{Context, Result};
use colloquy_nlp::{
    Grammar, Lexicon, ParseResult, PartOfSpeech, Phrase, PhraseNode, TemplateId, TemplateRegistry,
    Token, TokenKind, Translator, TranslatorConfig, TranslatorState, Word,
};
use colloquy_query::Schema;

pub fn schema() -> Result<Schema> {
    Schema::from_json(include_str!("../fixtures/schema.json")).context("loading schema fixture")
}

pub fn lexicon() -> Result<Lexicon> {
    Lexicon::from_json(include_str!("../fixtures/lexicon.json")).context("loading lexicon fixture")
}

pub fn registry() -> Result<TemplateRegistry> {
    TemplateRegistry::from_json(include_str!("../fixtures/templates.json"))
        .context("loading template fixture")
}

pub fn translator(config: TranslatorConfig) -> Result<Translator<Lexicon, impl Grammar>> {
    Ok(Translator::new(registry()?, lexicon()?, parse).with_config(config))
}

pub fn start() -> Result<TranslatorState> {
    Ok(TranslatorState::new(schema()?))
}

fn parse(lexemes: &[PhraseNode], template: &TemplateId) -> ParseResult {
    let mut cursor = Cursor { lexemes, pos: 0 };
    let phrase = match template.as_str() {
        "vpShow" => show(&mut cursor),
        "vpSort" => sort(&mut cursor),
        "vpNameContains" => name_contains(&mut cursor),
        "ppDirection" => direction(&mut cursor),
        _ => None,
    };
    match phrase {
        Some(phrase) => {
            cursor.terminal();
            ParseResult::Success {
                phrase,
                rest: cursor.rest(),
            }
        }
        None => ParseResult::Failure,
    }
}

struct Cursor<'a> {
    lexemes: &'a [PhraseNode],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a PhraseNode> {
        self.lexemes.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a PhraseNode> {
        let node = self.peek();
        if node.is_some() {
            self.pos += 1;
        }
        node
    }

    fn rest(&self) -> usize {
        self.lexemes.len() - self.pos
    }

    fn word(&mut self, pos: PartOfSpeech) -> Option<Word> {
        match self.peek() {
            Some(PhraseNode::Word(word)) if word.pos == pos => {
                self.advance();
                Some(word.clone())
            }
            _ => None,
        }
    }

    fn word_in(&mut self, pos: PartOfSpeech, lemmas: &[&str]) -> Option<Word> {
        match self.peek() {
            Some(PhraseNode::Word(word)) if word.pos == pos && lemmas.contains(&word.lemma.as_str()) => {
                self.advance();
                Some(word.clone())
            }
            _ => None,
        }
    }

    fn token(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        match self.peek() {
            Some(PhraseNode::Token(token)) if kinds.contains(&token.kind) => {
                self.advance();
                Some(token.clone())
            }
            _ => None,
        }
    }

    /// A noun, or a token standing where a noun would.
    fn noun(&mut self) -> Option<PhraseNode> {
        if let Some(word) = self.word(PartOfSpeech::Noun) {
            return Some(word.into());
        }
        self.token(&[TokenKind::Word, TokenKind::Identifier, TokenKind::QuotedLiteral])
            .map(PhraseNode::from)
    }

    fn punctuation(&mut self, text: &str) -> bool {
        match self.peek() {
            Some(PhraseNode::Token(token)) if token.is_punctuation(text) => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn terminal(&mut self) {
        let _ = self.punctuation(".") || self.punctuation("!") || self.punctuation("?");
    }

    /// Run `rule`, rewinding when it does not match.
    fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let saved = self.pos;
        let result = rule(self);
        if result.is_none() {
            self.pos = saved;
        }
        result
    }
}

fn show(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let verb = cursor.word_in(PartOfSpeech::Verb, &["show", "delete"])?;
    let object = object(cursor)?;
    Some(Phrase::new("vpShow").with_head(verb).with_head(object))
}

fn object(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let mut adjuncts = Vec::new();
    if let Some(all) = cursor.word_in(PartOfSpeech::Adjective, &["all"]) {
        adjuncts.push(Phrase::new("apAll").with_head(all));
    }
    if let Some(first) = cursor.attempt(|c| {
        let first = c.word_in(PartOfSpeech::Adjective, &["first"])?;
        let count = c.token(&[TokenKind::Numeral])?;
        Some(Phrase::new("apFirst").with_head(first).with_head(count))
    }) {
        adjuncts.push(first);
    }

    let mut phrase = Phrase::new("npObject").with_head(cursor.noun()?);
    for adjunct in adjuncts {
        phrase = phrase.with_adjunct(adjunct);
    }
    while let Some(place) = cursor.attempt(place) {
        phrase = phrase.with_complement(place);
    }
    Some(phrase)
}

fn place(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let located = cursor.word(PartOfSpeech::Participle);
    let preposition = cursor.word_in(PartOfSpeech::Preposition, &["in", "from"])?;
    let noun = cursor.noun()?;
    let mut phrase = Phrase::new("ppPlace").with_head(preposition).with_head(noun);
    if let Some(located) = located {
        phrase = phrase.with_adjunct(Phrase::new("apLocated").with_head(located));
    }
    Some(phrase)
}

fn sort(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let verb = cursor.word_in(PartOfSpeech::Verb, &["sort"])?;
    let mut phrase = Phrase::new("vpSort").with_head(verb);
    while let Some(key) = cursor.attempt(order_by).or_else(|| cursor.attempt(direction)) {
        phrase = phrase.with_complement(key);
        cursor.punctuation(",");
    }
    Some(phrase)
}

fn order_by(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let by = cursor.word_in(PartOfSpeech::Preposition, &["by"])?;
    let noun = cursor.noun()?;
    Some(Phrase::new("ppOrderBy").with_head(by).with_head(noun))
}

fn direction(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let adverb = cursor.word(PartOfSpeech::Adverb)?;
    Some(Phrase::new("ppDirection").with_head(adverb))
}

fn name_contains(cursor: &mut Cursor<'_>) -> Option<Phrase> {
    let noun = cursor.noun()?;
    let verb = cursor.word_in(PartOfSpeech::Verb, &["contain"])?;
    let value = cursor.token(&[TokenKind::QuotedLiteral])?;
    Some(
        Phrase::new("vpNameContains")
            .with_head(noun)
            .with_head(verb)
            .with_head(value),
    )
}
