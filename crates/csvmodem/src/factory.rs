use std::io::Read;

use log::debug;

use crate::{
    char_class::ClassTable, config::ParserConfig, error::Error, tokenizer::Tokenizer,
};

/// Validates a dialect once and stamps out tokenizers for it.
///
/// The classification table is built at construction and shared read-only by
/// every tokenizer the factory produces, so independently-owned tokenizers
/// can read different sources concurrently.
///
/// # Examples
///
/// ```rust
/// use csvmodem::{ParserConfig, TokenizerFactory};
///
/// let factory = TokenizerFactory::new(ParserConfig::default())?;
/// let left = factory.tokenizer("a,b\n".as_bytes());
/// let right = factory.tokenizer("c,d\n".as_bytes());
/// # Ok::<(), csvmodem::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TokenizerFactory {
    config: ParserConfig,
    classes: ClassTable,
}

impl TokenizerFactory {
    /// Validates the configuration and builds the classification table.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when a mandatory character class is missing,
    /// the record separator is empty, or any configured character is outside
    /// the ASCII range. Never fails later than this.
    pub fn new(config: ParserConfig) -> Result<Self, Error> {
        let classes = ClassTable::build(&config)?;
        debug!(
            "dialect ready: field separator {:?}, record separator {:?}, quote {:?}, escape {:?}, lazy quotes {}, exact sequence {}",
            config.field_separator,
            config.record_separator,
            config.quote,
            config.escape,
            config.lazy_quotes,
            config.match_exact_sequence,
        );
        Ok(Self { config, classes })
    }

    /// A fresh tokenizer over `reader`, sharing this factory's dialect.
    pub fn tokenizer<R: Read>(&self, reader: R) -> Tokenizer<R> {
        Tokenizer::new(self.classes.clone(), &self.config, reader)
    }

    /// The validated dialect this factory was built from.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}
