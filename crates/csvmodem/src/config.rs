/// A fully-resolved CSV dialect description.
///
/// `csvmodem` does not read configuration files; whoever owns the dialect
/// (a settings layer, a command line, a hardcoded constant) hands a finished
/// `ParserConfig` to [`TokenizerFactory`], which validates it once and builds
/// the character classification table from it.
///
/// # Examples
///
/// ```rust
/// use csvmodem::ParserConfig;
///
/// let semicolons = ParserConfig {
///     field_separator: ';',
///     record_separator: "\r\n".into(),
///     match_exact_sequence: true,
///     ..ParserConfig::default()
/// };
/// ```
///
/// [`TokenizerFactory`]: crate::TokenizerFactory
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// The quote character opening and closing quoted fields.
    ///
    /// # Default
    ///
    /// `'"'`
    pub quote: char,

    /// Optional escape character. The character immediately following it is
    /// taken literally, whatever its own class would be.
    ///
    /// # Default
    ///
    /// `None`
    pub escape: Option<char>,

    /// The character separating fields within a record.
    ///
    /// # Default
    ///
    /// `','`
    pub field_separator: char,

    /// The record separator sequence, one or more characters.
    ///
    /// With [`match_exact_sequence`] unset, any run of characters from this
    /// sequence counts as a single record boundary; when set, only the exact
    /// ordered sequence does.
    ///
    /// # Default
    ///
    /// `"\n"`
    ///
    /// [`match_exact_sequence`]: ParserConfig::match_exact_sequence
    pub record_separator: String,

    /// Characters dropped from the stream entirely, in any state except
    /// directly after an escape.
    ///
    /// # Default
    ///
    /// empty
    pub ignore: Vec<char>,

    /// Characters trimmed around field content: dropped at the start of a
    /// field, and at its end unless normal content resumes after them.
    ///
    /// # Default
    ///
    /// `[' ', '\t']`
    pub ignore_around_fields: Vec<char>,

    /// Tolerate quote characters in places the strict grammar rejects:
    /// a literal quote inside an unquoted field, or content resuming after a
    /// closing quote, both become field content instead of errors.
    ///
    /// # Default
    ///
    /// `false`
    pub lazy_quotes: bool,

    /// Match the record separator as an exact ordered sequence instead of
    /// collapsing any run of separator-class characters.
    ///
    /// # Default
    ///
    /// `false`
    pub match_exact_sequence: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            quote: '"',
            escape: None,
            field_separator: ',',
            record_separator: "\n".into(),
            ignore: Vec::new(),
            ignore_around_fields: vec![' ', '\t'],
            lazy_quotes: false,
            match_exact_sequence: false,
        }
    }
}
