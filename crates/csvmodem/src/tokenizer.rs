//! The CSV tokenizer state machine.
//!
//! A [`Tokenizer`] consumes characters from a buffered source one at a time,
//! classifies each against the dialect's [`ClassTable`], and dispatches on
//! the `(state, class)` pair. Each transition may append to the field
//! buffer, switch state, or terminate the current token; the caller drives
//! repeated [`Tokenizer::next_token`] calls until [`Token::EndOfData`].
//!
//! # Examples
//!
//! ```rust
//! use csvmodem::{ParserConfig, Token, TokenizerFactory};
//!
//! let factory = TokenizerFactory::new(ParserConfig::default())?;
//! let mut tokenizer = factory.tokenizer("\"a\"\"b\",c\n".as_bytes());
//! assert_eq!(tokenizer.next_token()?, Token::Field);
//! assert_eq!(tokenizer.value(), Some("a\"b"));
//! # Ok::<(), csvmodem::Error>(())
//! ```

use std::io::Read;

use log::{debug, trace};

use crate::{
    char_class::{CharacterClass, ClassTable},
    config::ParserConfig,
    error::Error,
    field_buffer::FieldBuffer,
    source::Source,
};

/// One unit of tokenizer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    /// A field ended; its value is available through [`Tokenizer::value`].
    Field,
    /// A record boundary. No value.
    EndOfRecord,
    /// The source is exhausted. Terminal: repeated calls keep returning it.
    EndOfData,
}

/// Tokenizer states. `Initial` is the per-field start state; termination is
/// signaled through the returned token, not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    Normal,
    NormalEscape,
    NormalEnd,
    Quoted,
    QuotedEscape,
    QuotedEnd,
    DoubleQuote,
}

/// Why the current field stopped. Remembered across calls to disambiguate
/// trailing empty fields at end of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    Unknown,
    FieldSeparator,
    RecordSeparator,
    DataEnd,
}

/// Outcome of feeding one classified character to the state machine.
enum Step {
    Continue,
    End(EndReason),
}

/// Fixed two-slot queue for tokens implied by an earlier one: a field ending
/// at a record boundary enqueues `EndOfRecord`, and ending at end-of-data
/// enqueues `EndOfRecord` then `EndOfData`.
#[derive(Debug, Default)]
struct PendingTokens {
    slots: [Option<Token>; 2],
}

impl PendingTokens {
    fn push(&mut self, token: Token) {
        debug_assert!(self.slots[1].is_none());
        if self.slots[0].is_none() {
            self.slots[0] = Some(token);
        } else {
            self.slots[1] = Some(token);
        }
    }

    fn pop(&mut self) -> Option<Token> {
        let token = self.slots[0].take();
        self.slots[0] = self.slots[1].take();
        token
    }
}

/// The streaming CSV tokenizer.
///
/// One tokenizer owns one character source and is strictly single-threaded;
/// independent sources need independent tokenizers (the factory and its
/// class table are freely shareable).
#[derive(Debug)]
pub struct Tokenizer<R> {
    source: Source<R>,
    classes: ClassTable,
    record_separator: Vec<char>,
    lazy_quotes: bool,
    match_exact_sequence: bool,

    state: State,
    field: FieldBuffer,
    pending: PendingTokens,
    pushback: Vec<char>,
    value: Option<String>,
    previous_end: EndReason,
    done: bool,

    /// Raw characters processed by the current call, ignored ones included.
    /// Characters handed back through [`Tokenizer::unread`] count in the
    /// call that finally keeps them.
    chars_read: usize,
    line: usize,
    column: usize,
}

impl<R: Read> Tokenizer<R> {
    pub(crate) fn new(classes: ClassTable, config: &ParserConfig, reader: R) -> Self {
        Self {
            source: Source::new(reader),
            classes,
            record_separator: config.record_separator.chars().collect(),
            lazy_quotes: config.lazy_quotes,
            match_exact_sequence: config.match_exact_sequence,

            state: State::Initial,
            field: FieldBuffer::new(),
            pending: PendingTokens::default(),
            pushback: Vec::new(),
            value: None,
            previous_end: EndReason::Unknown,
            done: false,

            chars_read: 0,
            line: 1,
            column: 0,
        }
    }

    /// Reads the next token, materializing field content.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] when the stream violates the dialect's
    /// quoting or escaping rules, [`Error::Io`] when the source fails.
    /// Both are fatal for this instance.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.advance(true)
    }

    /// Identical state-machine traversal to [`next_token`], with all buffer
    /// writes skipped. Used to discard unwanted columns cheaply.
    ///
    /// # Errors
    ///
    /// Same conditions as [`next_token`].
    ///
    /// [`next_token`]: Tokenizer::next_token
    pub fn skip_token(&mut self) -> Result<Token, Error> {
        self.advance(false)
    }

    /// The value of the most recent [`Token::Field`].
    ///
    /// `None` after any other token, after [`skip_token`], and for
    /// zero-length fields.
    ///
    /// [`skip_token`]: Tokenizer::skip_token
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// 1-based line of the character read last.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the character read last.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Releases the underlying source. Idempotent; reading after close is a
    /// caller contract violation and simply reports end of data.
    pub fn close(&mut self) {
        self.source.close();
    }

    fn advance(&mut self, read: bool) -> Result<Token, Error> {
        self.value = None;
        if let Some(token) = self.pending.pop() {
            if token == Token::EndOfData {
                self.done = true;
            }
            trace!("pending token {token:?}");
            return Ok(token);
        }
        if self.done {
            return Ok(Token::EndOfData);
        }

        self.state = State::Initial;
        self.field.clear();
        self.chars_read = 0;

        loop {
            let Some(ch) = self.next_char()? else {
                return self.end_of_stream(read);
            };
            let class = self.classes.classify(ch);
            match self.step(ch, class, read)? {
                Step::Continue => {}
                Step::End(reason) => return self.finish_field(reason, read),
            }
        }
    }

    /// One character from the pushback stack or the source. Line and column
    /// only advance on first consumption, but the raw character count is
    /// charged to the call that actually processes the character: [`unread`]
    /// refunds it, and the pop here re-counts it. A boundary look-ahead
    /// carried into the next call is therefore visible to that call's count.
    ///
    /// [`unread`]: Tokenizer::unread
    fn next_char(&mut self) -> Result<Option<char>, Error> {
        if let Some(ch) = self.pushback.pop() {
            self.chars_read += 1;
            return Ok(Some(ch));
        }
        match self.source.next_char()? {
            Some(ch) => {
                self.chars_read += 1;
                if ch == '\n' {
                    self.line += 1;
                    self.column = 0;
                } else {
                    self.column += 1;
                }
                Ok(Some(ch))
            }
            None => Ok(None),
        }
    }

    /// Returns a character obtained from [`next_char`] for reprocessing and
    /// refunds it from the raw count, so it counts exactly once, in the call
    /// that consumes it for good.
    ///
    /// [`next_char`]: Tokenizer::next_char
    fn unread(&mut self, ch: char) {
        self.pushback.push(ch);
        self.chars_read -= 1;
    }

    #[allow(clippy::too_many_lines)]
    fn step(&mut self, ch: char, class: CharacterClass, read: bool) -> Result<Step, Error> {
        use CharacterClass as Class;

        match (self.state, class) {
            // The character after an escape is literal content, whatever its
            // own class would be.
            (State::NormalEscape, _) => {
                self.field.append(ch, read);
                self.state = State::Normal;
                Ok(Step::Continue)
            }
            (State::QuotedEscape, _) => {
                self.field.append(ch, read);
                self.state = State::Quoted;
                Ok(Step::Continue)
            }

            // Ignored characters vanish everywhere else.
            (_, Class::ToIgnore) => Ok(Step::Continue),

            (State::Initial, Class::Normal) => {
                self.field.append(ch, read);
                self.state = State::Normal;
                Ok(Step::Continue)
            }
            (State::Initial, Class::Escape) => {
                self.state = State::NormalEscape;
                Ok(Step::Continue)
            }
            (State::Initial, Class::Quote) => {
                self.state = State::Quoted;
                Ok(Step::Continue)
            }
            (State::Initial, Class::FieldSeparator) => Ok(Step::End(EndReason::FieldSeparator)),
            (State::Initial, Class::RecordSeparator) => self.record_boundary(ch, read),
            // Leading trivia is dropped outright.
            (State::Initial, Class::ToIgnoreAroundFields) => Ok(Step::Continue),

            (State::Normal, Class::Normal) => {
                self.field.append(ch, read);
                Ok(Step::Continue)
            }
            (State::Normal, Class::Escape) => {
                self.state = State::NormalEscape;
                Ok(Step::Continue)
            }
            (State::Normal, Class::Quote) => self.quote_in_content(ch, read),
            (State::Normal, Class::FieldSeparator) => Ok(Step::End(EndReason::FieldSeparator)),
            (State::Normal, Class::RecordSeparator) => self.record_boundary(ch, read),
            (State::Normal, Class::ToIgnoreAroundFields) => {
                // Maybe trailing trivia, maybe interior: buffer under a mark.
                self.field.mark();
                self.field.append(ch, read);
                self.state = State::NormalEnd;
                Ok(Step::Continue)
            }

            (State::NormalEnd, Class::Normal) => {
                // The run was interior after all; the append kills the mark.
                self.field.append(ch, read);
                self.state = State::Normal;
                Ok(Step::Continue)
            }
            (State::NormalEnd, Class::Escape) => {
                self.state = State::NormalEscape;
                Ok(Step::Continue)
            }
            (State::NormalEnd, Class::Quote) => self.quote_in_content(ch, read),
            (State::NormalEnd, Class::FieldSeparator) => Ok(Step::End(EndReason::FieldSeparator)),
            (State::NormalEnd, Class::RecordSeparator) => self.record_boundary(ch, read),
            (State::NormalEnd, Class::ToIgnoreAroundFields) => {
                self.field.extend_mark();
                self.field.append(ch, read);
                Ok(Step::Continue)
            }

            (State::Quoted, Class::Escape) => {
                self.state = State::QuotedEscape;
                Ok(Step::Continue)
            }
            (State::Quoted, Class::Quote) => {
                // Tentative closing quote: kept only if it turns out doubled.
                self.field.mark();
                self.field.append(ch, read);
                self.state = State::DoubleQuote;
                Ok(Step::Continue)
            }
            // Separators and trivia are plain content inside quotes.
            (State::Quoted, _) => {
                self.field.append(ch, read);
                Ok(Step::Continue)
            }

            (State::DoubleQuote, Class::Quote) => {
                // Doubled quote: the marked character is the literal.
                self.state = State::Quoted;
                Ok(Step::Continue)
            }
            (State::DoubleQuote, Class::FieldSeparator) => {
                Ok(Step::End(EndReason::FieldSeparator))
            }
            (State::DoubleQuote, Class::RecordSeparator) => self.record_boundary(ch, read),
            (State::DoubleQuote, Class::ToIgnoreAroundFields) => {
                self.field.extend_mark();
                self.field.append(ch, read);
                self.state = State::QuotedEnd;
                Ok(Step::Continue)
            }
            (State::DoubleQuote, Class::Normal) => self.resume_after_quote(ch, read),
            (State::DoubleQuote, Class::Escape) => self.escape_after_quote(),

            (State::QuotedEnd, Class::FieldSeparator) => Ok(Step::End(EndReason::FieldSeparator)),
            (State::QuotedEnd, Class::RecordSeparator) => self.record_boundary(ch, read),
            (State::QuotedEnd, Class::ToIgnoreAroundFields) => {
                self.field.extend_mark();
                self.field.append(ch, read);
                Ok(Step::Continue)
            }
            (State::QuotedEnd, Class::Normal | Class::Quote) => self.resume_after_quote(ch, read),
            (State::QuotedEnd, Class::Escape) => self.escape_after_quote(),
        }
    }

    /// A quote character in the middle of unquoted content.
    fn quote_in_content(&mut self, ch: char, read: bool) -> Result<Step, Error> {
        if self.lazy_quotes {
            self.field.append(ch, read);
            self.state = State::Normal;
            Ok(Step::Continue)
        } else {
            Err(self.malformed("unexpected quote character inside an unquoted field"))
        }
    }

    /// Content resuming after a tentative closing quote. Lazy mode keeps the
    /// quote and any trailing trivia as content of a pseudo-quoted field.
    fn resume_after_quote(&mut self, ch: char, read: bool) -> Result<Step, Error> {
        if self.lazy_quotes {
            self.field.append(ch, read);
            self.state = State::Quoted;
            Ok(Step::Continue)
        } else {
            Err(self.malformed("unexpected character after a closing quote"))
        }
    }

    fn escape_after_quote(&mut self) -> Result<Step, Error> {
        if self.lazy_quotes {
            self.state = State::QuotedEscape;
            Ok(Step::Continue)
        } else {
            Err(self.malformed("unexpected character after a closing quote"))
        }
    }

    /// A record-separator-class character in a position where it may end the
    /// record. Dispatches to the configured matching strategy.
    fn record_boundary(&mut self, first: char, read: bool) -> Result<Step, Error> {
        if self.match_exact_sequence {
            return self.match_exact(first, read);
        }

        // Any-separator: the first separator-class character is the boundary;
        // a following run of them (CRLF pairs, blank lines) collapses into it.
        loop {
            match self.next_char()? {
                Some(ch) if self.classes.classify(ch) == CharacterClass::RecordSeparator => {}
                Some(ch) => {
                    self.unread(ch);
                    break;
                }
                // End of stream mid-run is still a valid boundary.
                None => break,
            }
        }
        Ok(Step::End(EndReason::RecordSeparator))
    }

    /// Exact-sequence strategy: the full configured sequence must follow. On
    /// a partial mismatch the consumed prefix is re-emitted as literal
    /// content and the mismatching character reprocessed normally.
    fn match_exact(&mut self, first: char, read: bool) -> Result<Step, Error> {
        if first != self.record_separator[0] {
            // Separator-class, but cannot start the sequence: plain content.
            return self.literal(first, read);
        }
        let mut matched = 1;
        while matched < self.record_separator.len() {
            let next = self.next_char()?;
            match next {
                Some(ch) if ch == self.record_separator[matched] => matched += 1,
                mismatch => {
                    for i in 0..matched {
                        let prefix = self.record_separator[i];
                        self.literal(prefix, read)?;
                    }
                    if let Some(ch) = mismatch {
                        self.unread(ch);
                    }
                    return Ok(Step::Continue);
                }
            }
        }
        Ok(Step::End(EndReason::RecordSeparator))
    }

    /// Runs one character through the state machine as if it were classified
    /// `Normal`. In strict mode this is where a failed separator match after
    /// a closing quote turns into a malformed-input error.
    fn literal(&mut self, ch: char, read: bool) -> Result<Step, Error> {
        self.step(ch, CharacterClass::Normal, read)
    }

    fn finish_field(&mut self, reason: EndReason, read: bool) -> Result<Token, Error> {
        self.field.rollback_to_mark();
        self.previous_end = reason;
        if read {
            self.value = self.field.materialize();
        }
        if reason == EndReason::RecordSeparator {
            self.pending.push(Token::EndOfRecord);
        }
        trace!("field of {} chars ended by {reason:?}", self.field.len());
        Ok(Token::Field)
    }

    fn end_of_stream(&mut self, read: bool) -> Result<Token, Error> {
        match self.state {
            State::NormalEscape => {
                return Err(self.malformed("solitary escape character at end of data"));
            }
            State::Quoted => return Err(self.malformed("unclosed quoted field at end of data")),
            State::QuotedEscape => {
                return Err(
                    self.malformed("unclosed quoted field and solitary escape at end of data")
                );
            }
            State::NormalEnd | State::QuotedEnd | State::DoubleQuote => {
                self.field.rollback_to_mark();
            }
            State::Initial | State::Normal => {}
        }

        // A record separator directly followed by end-of-stream must not
        // manufacture a spurious empty trailing field; an empty field with no
        // earlier end-reason means the whole source was empty.
        let empty = self.field.is_empty();
        let after_separator =
            self.previous_end == EndReason::RecordSeparator && self.chars_read < 2;
        let empty_source = self.previous_end == EndReason::Unknown && empty;
        if (empty && after_separator) || empty_source {
            self.done = true;
            trace!("end of data");
            return Ok(Token::EndOfData);
        }

        self.previous_end = EndReason::DataEnd;
        if read {
            self.value = self.field.materialize();
        }
        self.pending.push(Token::EndOfRecord);
        self.pending.push(Token::EndOfData);
        trace!("final field of {} chars at end of data", self.field.len());
        Ok(Token::Field)
    }

    fn malformed(&self, msg: &str) -> Error {
        debug!("malformed input at {}:{}: {msg}", self.line, self.column);
        Error::MalformedInput {
            msg: msg.into(),
            line: self.line,
            column: self.column,
        }
    }
}

/// Yields tokens through the first [`Token::EndOfData`] or error, then ends.
impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
            token => Some(token),
        }
    }
}
