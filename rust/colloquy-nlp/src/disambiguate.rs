//! Reading selection and term coordination.
//!
//! The disambiguator turns a tokenized sentence into the lexemes a grammar
//! consumes. Each word token becomes a [`Word`] carrying its first reading;
//! words the morphology does not know stay tokens. Only one variant is
//! produced.
//!
//! With coordination on, lists such as "Minsk, Pinsk and Brest" fold into
//! their first word. Peers must share its part of speech and be separated by
//! a comma or a conjunction; the separators and peers are kept, in order, in
//! [`Word::coordinated`].

use crate::morphology::Morphology;
use crate::phrase::{PartOfSpeech, PhraseNode, TokenKind, Word};
use crate::tokenizer::Sentence;

pub struct Disambiguator<'m, M> {
    morphology: &'m M,
    coordinate: bool,
}

impl<'m, M: Morphology> Disambiguator<'m, M> {
    pub fn new(morphology: &'m M) -> Self {
        Self {
            morphology,
            coordinate: true,
        }
    }

    pub fn coordinate(mut self, coordinate: bool) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn disambiguate(&self, sentence: &Sentence) -> Vec<PhraseNode> {
        let lexemes: Vec<PhraseNode> = sentence
            .tokens
            .iter()
            .map(|token| match token.kind {
                TokenKind::Word => match self.morphology.analyze(&token.text).first() {
                    Some(reading) => PhraseNode::Word(reading.to_word(token.text.as_str())),
                    None => PhraseNode::Token(token.clone()),
                },
                _ => PhraseNode::Token(token.clone()),
            })
            .collect();

        if self.coordinate {
            coordinate(&lexemes)
        } else {
            lexemes
        }
    }
}

fn is_separator(node: &PhraseNode) -> bool {
    match node {
        PhraseNode::Word(word) => word.pos == PartOfSpeech::Conjunction,
        PhraseNode::Token(token) => token.is_punctuation(","),
        PhraseNode::Phrase(_) | PhraseNode::Empty => false,
    }
}

/// Length of the separators and peer that continue the list headed by
/// `head` at the start of `nodes`.
fn continuation(head: &Word, nodes: &[PhraseNode]) -> Option<usize> {
    // "X, and Y" carries two separators.
    let separators = nodes.iter().take_while(|n| is_separator(n)).count().min(2);
    if separators == 0 {
        return None;
    }
    matches!(nodes.get(separators), Some(PhraseNode::Word(peer)) if peer.pos == head.pos)
        .then_some(separators + 1)
}

fn coordinate(lexemes: &[PhraseNode]) -> Vec<PhraseNode> {
    let mut folded = Vec::with_capacity(lexemes.len());
    let mut i = 0;
    while i < lexemes.len() {
        let mut node = lexemes[i].clone();
        i += 1;
        if let PhraseNode::Word(head) = &mut node
            && head.pos != PartOfSpeech::Conjunction
        {
            while let Some(len) = continuation(head, &lexemes[i..]) {
                head.coordinated.extend_from_slice(&lexemes[i..i + len]);
                i += len;
            }
        }
        folded.push(node);
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{Lexicon, Reading};
    use crate::tokenizer::{SentenceTokenizer, Tokenizer};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn lexicon() -> Lexicon {
        Lexicon::new()
            .with("show", Reading::new(PartOfSpeech::Verb, "show"))
            .with("sort", Reading::new(PartOfSpeech::Verb, "sort"))
            .with("companies", Reading::new(PartOfSpeech::Noun, "company").with_meaning("Organization"))
            .with("from", Reading::new(PartOfSpeech::Preposition, "from"))
            .with("by", Reading::new(PartOfSpeech::Preposition, "by"))
            .with("and", Reading::new(PartOfSpeech::Conjunction, "and"))
            .with("name", Reading::new(PartOfSpeech::Noun, "name"))
            .with("descending", Reading::new(PartOfSpeech::Adverb, "descending"))
            .with("minsk", Reading::new(PartOfSpeech::Noun, "Minsk").with_meaning("Location"))
            .with("pinsk", Reading::new(PartOfSpeech::Noun, "Pinsk").with_meaning("Location"))
            .with("brest", Reading::new(PartOfSpeech::Noun, "Brest").with_meaning("Location"))
    }

    fn lexemes(text: &str, coordinate: bool) -> Vec<PhraseNode> {
        let lexicon = lexicon();
        let sentence = SentenceTokenizer.tokenize(text).remove(0);
        Disambiguator::new(&lexicon)
            .coordinate(coordinate)
            .disambiguate(&sentence)
    }

    fn display(nodes: &[PhraseNode]) -> Vec<String> {
        nodes.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn words_take_their_first_reading() -> TestResult {
        let nodes = lexemes("Show companies from Minsk.", false);
        let word = nodes[1].as_word().ok_or("second lexeme is not a word")?;
        assert_eq!(word.lemma, "company");
        assert_eq!(word.surface, "companies");
        assert_eq!(nodes[3].as_word().map(|w| w.lemma.as_str()), Some("Minsk"));
        Ok(())
    }

    #[test]
    fn unknown_words_stay_tokens() {
        let nodes = lexemes("Show unicorns.", false);
        assert_eq!(nodes[1].as_token().map(|t| t.kind), Some(TokenKind::Word));
    }

    #[test]
    fn lists_fold_into_their_first_word() {
        let nodes = lexemes("Show companies from Minsk, Pinsk and Brest.", true);
        assert_eq!(
            display(&nodes),
            vec!["Show", "companies", "from", "Minsk, Pinsk and Brest", "."]
        );
        let lemmas: Vec<&str> = nodes[3]
            .view()
            .terms()
            .iter()
            .filter_map(|t| t.as_word())
            .map(|w| w.lemma.as_str())
            .collect();
        assert_eq!(lemmas, vec!["Minsk", "Pinsk", "Brest"]);
    }

    #[test]
    fn serial_comma_is_absorbed() {
        let nodes = lexemes("Minsk, Pinsk, and Brest.", true);
        assert_eq!(display(&nodes), vec!["Minsk, Pinsk, and Brest", "."]);
    }

    #[test]
    fn different_parts_of_speech_are_not_coordinated() {
        let nodes = lexemes("Sort by name, descending.", true);
        assert_eq!(display(&nodes), vec!["Sort", "by", "name", ",", "descending", "."]);
    }

    #[test]
    fn coordination_can_be_turned_off() {
        let nodes = lexemes("Minsk and Pinsk.", false);
        assert_eq!(nodes.len(), 4);
    }
}
