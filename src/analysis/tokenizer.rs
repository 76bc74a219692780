use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

/// Standard Unicode tokenizer
#[derive(Clone)]
pub struct StandardTokenizer {
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (offset, word) in text.unicode_word_indices() {
            if word.len() <= self.max_token_length {
                tokens.push(Token::new(word.to_string(), position, offset));
                position += 1;
            }
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(self.clone())
    }
}

/// Splits on every non-letter character; digits and punctuation never reach a token.
#[derive(Clone, Default)]
pub struct LetterTokenizer;

impl Tokenizer for LetterTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (offset, ch) in text.char_indices() {
            match (ch.is_alphabetic(), start) {
                (true, None) => start = Some(offset),
                (false, Some(begin)) => {
                    let position = tokens.len() as u32;
                    tokens.push(Token::new(text[begin..offset].to_string(), position, begin));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(begin) = start {
            let position = tokens.len() as u32;
            tokens.push(Token::new(text[begin..].to_string(), position, begin));
        }

        tokens
    }

    fn name(&self) -> &str {
        "letter"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(LetterTokenizer)
    }
}
