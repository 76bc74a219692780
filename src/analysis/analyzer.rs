use std::fmt;
use rust_stemmers::Algorithm;
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{LetterTokenizer, StandardTokenizer, Tokenizer};
use crate::core::config::{AnalyzerConfig, TokenizerKind};

/// Text analysis pipeline: tokenizer, then filters, then the optional stemmer.
///
/// One analyzer instance is owned by the index and reused for query terms, so
/// both sides of a match are normalized identically.
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub stemmer: Option<StemmerFilter>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            stemmer: None,
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_stemmer(mut self, algorithm: Algorithm) -> Self {
        self.stemmer = Some(StemmerFilter::new(algorithm));
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        match &self.stemmer {
            Some(stemmer) => stemmer.filter(tokens),
            None => tokens,
        }
    }

    /// Normalized token texts in order
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|token| token.text).collect()
    }

    /// Stemming stage alone; identity when the analyzer does not stem
    pub fn stem(&self, token: &str) -> String {
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(token),
            None => token.to_string(),
        }
    }

    pub fn is_stemming(&self) -> bool {
        self.stemmer.is_some()
    }

    /// Unicode words, lowercased, English stop words removed
    pub fn standard() -> Self {
        Analyzer::new("standard".to_string(),
                      Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StopWordFilter::english()))
    }

    /// Letter runs, lowercased, English (Porter family) stemming
    pub fn english_stemming() -> Self {
        Analyzer::new("english_stemming".to_string(), Box::new(LetterTokenizer))
            .add_filter(Box::new(LowercaseFilter))
            .with_stemmer(Algorithm::English)
    }

    /// Unicode words, lowercased
    pub fn simple() -> Self {
        Analyzer::new("simple".to_string(), Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let tokenizer: Box<dyn Tokenizer> = match config.tokenizer {
            TokenizerKind::Standard => Box::new(StandardTokenizer::default()),
            TokenizerKind::Letter => Box::new(LetterTokenizer),
        };
        let name = format!(
            "{}{}{}",
            tokenizer.name(),
            if config.stop_words { "+stop_words" } else { "" },
            if config.stemming { "+stemmer" } else { "" },
        );

        let mut analyzer = Analyzer::new(name, tokenizer).add_filter(Box::new(LowercaseFilter));
        if config.stop_words {
            analyzer = analyzer.add_filter(Box::new(StopWordFilter::english()));
        }
        if config.stemming {
            analyzer = analyzer.with_stemmer(Algorithm::English);
        }
        analyzer
    }
}

impl Clone for Analyzer {
    fn clone(&self) -> Self {
        Analyzer {
            tokenizer: self.tokenizer.clone_box(),
            filters: self.filters.iter().map(|f| f.clone_box()).collect(),
            stemmer: self.stemmer.as_ref().map(|s| StemmerFilter::new(s.algorithm)),
            name: self.name.clone(),
        }
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("stemming", &self.is_stemming())
            .finish()
    }
}
