use thiserror::Error;

/// Errors produced while configuring or driving a tokenizer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A mandatory character class is missing or a configured character falls
    /// outside the ASCII range. Raised eagerly at factory construction, never
    /// mid-stream.
    #[error("invalid tokenizer configuration: {0}")]
    Configuration(String),

    /// The character stream violated the quoting or escaping rules of the
    /// active dialect. Fatal: the tokenizer's buffer state is stale once this
    /// is returned and the instance must be discarded.
    #[error("malformed input at {line}:{column}: {msg}")]
    MalformedInput {
        /// What the stream looked like at the point of failure.
        msg: String,
        /// 1-based line of the offending character.
        line: usize,
        /// 1-based column of the offending character.
        column: usize,
    },

    /// The underlying source failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
