//! Sentence splitting and token classification.
//!
//! [`SentenceTokenizer`] is a reference implementation of the
//! [`Tokenizer`] boundary. It splits text on `.`, `!` and `?` outside double
//! quotes, and classifies what it reads:
//!
//! - **Word**: letters, possibly with `-` or `'` (e.g. `companies`)
//! - **Identifier**: contains `_` or mixes letters and digits (`GD_COMPANY`)
//! - **Numeral**: digits, possibly with one decimal point (`10`, `2.5`)
//! - **QuotedLiteral**: `"..."`, quotes included
//! - **Punctuation**: everything else that is not whitespace
//!
//! ```
//! use colloquy_nlp::phrase::TokenKind;
//! use colloquy_nlp::tokenizer::{SentenceTokenizer, Tokenizer};
//!
//! let sentences = SentenceTokenizer.tokenize(r#"Show companies. Name contains "A. B."!"#);
//! assert_eq!(sentences.len(), 2);
//! assert_eq!(sentences[1].text, r#"Name contains "A. B."!"#);
//! assert_eq!(sentences[1].tokens[2].kind, TokenKind::QuotedLiteral);
//! ```

use serde::{Deserialize, Serialize};

use crate::phrase::{Token, TokenKind};

/// One sentence of the input with its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// The sentence as written, trimmed.
    pub text: String,
    pub tokens: Vec<Token>,
}

/// Splits text into tokenized sentences.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Sentence>;
}

/// Splits on terminal punctuation outside quotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceTokenizer;

fn is_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '\'')
}

fn classify(text: &str) -> TokenKind {
    let has_alpha = text.chars().any(char::is_alphabetic);
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    if !has_alpha && has_digit && !text.contains('_') {
        TokenKind::Numeral
    } else if text.contains('_') || (has_alpha && has_digit) {
        TokenKind::Identifier
    } else {
        TokenKind::Word
    }
}

/// Accumulates tokens of the sentence being read.
struct SentenceBuilder<'t> {
    source: &'t str,
    start: Option<usize>,
    tokens: Vec<Token>,
    sentences: Vec<Sentence>,
}

impl<'t> SentenceBuilder<'t> {
    fn push(&mut self, at: usize, kind: TokenKind, text: &str) {
        self.start.get_or_insert(at);
        self.tokens.push(Token::new(kind, text));
    }

    fn finish(&mut self, end: usize) {
        let tokens = std::mem::take(&mut self.tokens);
        let Some(start) = self.start.take() else {
            return;
        };
        if tokens.iter().all(|t| t.kind == TokenKind::Punctuation) {
            return;
        }
        let text = self.source[start..end].trim().to_string();
        tracing::trace!(%text, tokens = tokens.len(), "sentence split");
        self.sentences.push(Sentence { text, tokens });
    }
}

impl Tokenizer for SentenceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Sentence> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut builder = SentenceBuilder {
            source: text,
            start: None,
            tokens: Vec::new(),
            sentences: Vec::new(),
        };
        let offset = |i: usize| chars.get(i).map_or(text.len(), |&(at, _)| at);

        let mut i = 0;
        while i < chars.len() {
            let (at, ch) = chars[i];

            if ch.is_whitespace() {
                i += 1;
                continue;
            }

            if ch == '"' {
                let mut end = i + 1;
                while end < chars.len() && chars[end].1 != '"' {
                    end += 1;
                }
                // An unterminated quote runs to the end of the text.
                end = (end + 1).min(chars.len());
                builder.push(at, TokenKind::QuotedLiteral, &text[at..offset(end)]);
                i = end;
                continue;
            }

            if is_word_char(ch) {
                let mut end = i;
                while end < chars.len() {
                    let (_, c) = chars[end];
                    let decimal_point = c == '.'
                        && chars[i..end].iter().all(|(_, d)| d.is_ascii_digit())
                        && chars.get(end + 1).is_some_and(|(_, d)| d.is_ascii_digit());
                    if !(is_word_char(c) || decimal_point) {
                        break;
                    }
                    end += 1;
                }
                let word = &text[at..offset(end)];
                builder.push(at, classify(word), word);
                i = end;
                continue;
            }

            builder.push(at, TokenKind::Punctuation, &text[at..offset(i + 1)]);
            i += 1;
            if is_terminal(ch) {
                builder.finish(offset(i));
            }
        }
        builder.finish(text.len());
        builder.sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(sentence: &Sentence) -> Vec<(TokenKind, &str)> {
        sentence
            .tokens
            .iter()
            .map(|t| (t.kind, t.text.as_str()))
            .collect()
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = SentenceTokenizer.tokenize("Sort by name. Descending!  Why?");
        let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Sort by name.", "Descending!", "Why?"]);
    }

    #[test]
    fn keeps_trailing_text_without_a_terminator() {
        let sentences = SentenceTokenizer.tokenize("Show companies. Sort by name");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "Sort by name");
    }

    #[test]
    fn classifies_tokens() {
        let sentences =
            SentenceTokenizer.tokenize(r#"Show first 10 GD_COMPANY, ADDRESS2 from "Minsk" 2.5."#);
        assert_eq!(
            kinds(&sentences[0]),
            vec![
                (TokenKind::Word, "Show"),
                (TokenKind::Word, "first"),
                (TokenKind::Numeral, "10"),
                (TokenKind::Identifier, "GD_COMPANY"),
                (TokenKind::Punctuation, ","),
                (TokenKind::Identifier, "ADDRESS2"),
                (TokenKind::Word, "from"),
                (TokenKind::QuotedLiteral, "\"Minsk\""),
                (TokenKind::Numeral, "2.5"),
                (TokenKind::Punctuation, "."),
            ]
        );
    }

    #[test]
    fn terminators_inside_quotes_do_not_split() {
        let sentences = SentenceTokenizer.tokenize(r#"Name contains "Inc. Ltd?"."#);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].tokens[2].value(), "Inc. Ltd?");
    }

    #[test]
    fn blank_and_punctuation_only_input_has_no_sentences() {
        assert!(SentenceTokenizer.tokenize("").is_empty());
        assert!(SentenceTokenizer.tokenize("  ... !").is_empty());
    }
}
