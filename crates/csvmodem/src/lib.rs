//! A streaming, configurable CSV tokenizer.
//!
//! `csvmodem` turns a raw character stream into a sequence of
//! [`Token::Field`], [`Token::EndOfRecord`] and [`Token::EndOfData`] tokens
//! using a single-pass, buffered character-class state machine. Quoting,
//! escaping, multi-character record separators, lazy-quote tolerance and
//! field trimming are all dialect parameters, never hardcoded.
//!
//! # Examples
//!
//! ```rust
//! use csvmodem::{ParserConfig, Token, TokenizerFactory};
//!
//! let factory = TokenizerFactory::new(ParserConfig::default())?;
//! let mut tokenizer = factory.tokenizer("a,b\nc\n".as_bytes());
//!
//! let mut fields = Vec::new();
//! loop {
//!     match tokenizer.next_token()? {
//!         Token::Field => fields.push(tokenizer.value().unwrap_or_default().to_string()),
//!         Token::EndOfRecord => {}
//!         Token::EndOfData => break,
//!     }
//! }
//! assert_eq!(fields, ["a", "b", "c"]);
//! # Ok::<(), csvmodem::Error>(())
//! ```

mod char_class;
mod config;
mod error;
mod factory;
mod field_buffer;
mod source;
mod tokenizer;

#[cfg(test)]
mod tests;

pub use char_class::CharacterClass;
pub use config::ParserConfig;
pub use error::Error;
pub use factory::TokenizerFactory;
pub use tokenizer::{Token, Tokenizer};
