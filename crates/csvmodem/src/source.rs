use std::io::{self, Read};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Buffered, UTF-8 decoding wrapper around the underlying byte source.
///
/// Bytes are pulled in `READ_BUFFER_SIZE` slabs and decoded one `char` at a
/// time with [`bstr::decode_utf8`]. Invalid sequences decode to U+FFFD,
/// which the classifier treats as any other non-ASCII content character.
#[derive(Debug)]
pub(crate) struct Source<R> {
    reader: Option<R>,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> Source<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            buf: vec![0; READ_BUFFER_SIZE].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
        }
    }

    /// Decodes the next character, refilling from the reader as needed.
    /// `Ok(None)` is end of stream.
    pub(crate) fn next_char(&mut self) -> io::Result<Option<char>> {
        loop {
            match bstr::decode_utf8(&self.buf[self.start..self.end]) {
                (Some(ch), n) => {
                    self.start += n;
                    return Ok(Some(ch));
                }
                (None, 0) => {
                    if self.fill()? == 0 {
                        return Ok(None);
                    }
                }
                (None, n) => {
                    // A sequence truncated by the slab edge may complete on
                    // refill; one truncated by end-of-stream never will.
                    if self.start + n == self.end && !self.eof {
                        if self.fill()? == 0 {
                            self.start = self.end;
                            return Ok(Some(char::REPLACEMENT_CHARACTER));
                        }
                    } else {
                        self.start += n;
                        return Ok(Some(char::REPLACEMENT_CHARACTER));
                    }
                }
            }
        }
    }

    fn fill(&mut self) -> io::Result<usize> {
        if self.eof {
            return Ok(0);
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        let n = reader.read(&mut self.buf[self.end..])?;
        if n == 0 {
            self.eof = true;
        } else {
            self.end += n;
        }
        Ok(n)
    }

    /// Drops the underlying reader. Idempotent; the source reports end of
    /// stream afterwards.
    pub(crate) fn close(&mut self) {
        self.reader = None;
        self.eof = true;
    }
}

#[cfg(test)]
mod tests {
    use super::Source;

    fn drain<R: std::io::Read>(mut source: Source<R>) -> String {
        let mut out = String::new();
        while let Some(ch) = source.next_char().unwrap() {
            out.push(ch);
        }
        out
    }

    #[test]
    fn decodes_multibyte_content() {
        let source = Source::new("héllo, wörld".as_bytes());
        assert_eq!(drain(source), "héllo, wörld");
    }

    #[test]
    fn invalid_bytes_become_replacement_chars() {
        let source = Source::new(&b"a\xFFb"[..]);
        assert_eq!(drain(source), "a\u{FFFD}b");
    }

    #[test]
    fn sequence_truncated_by_end_of_stream() {
        // First byte of a two-byte sequence, then nothing.
        let source = Source::new(&b"a\xC3"[..]);
        assert_eq!(drain(source), "a\u{FFFD}");
    }

    #[test]
    fn close_is_idempotent_and_ends_the_stream() {
        let mut source = Source::new("abc".as_bytes());
        assert_eq!(source.next_char().unwrap(), Some('a'));
        source.close();
        source.close();
        assert_eq!(source.next_char().unwrap(), Some('b'));
        assert_eq!(source.next_char().unwrap(), Some('c'));
        assert_eq!(source.next_char().unwrap(), None);
    }
}
