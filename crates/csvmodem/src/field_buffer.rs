//! Field accumulator with a single tentative trailing mark.
//!
//! Trimming and quote handling both need to write characters that may or may
//! not turn out to be part of the field: trailing spaces are content if more
//! content follows, trivia if the separator does; a closing quote is content
//! only when doubled. Rather than backtracking the input, the tokenizer
//! appends speculatively under a *mark* and rolls the write back once the
//! next character disambiguates it.

/// A contiguous run of tentatively-written trailing characters.
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    len: usize,
}

/// Growable char buffer reused across many fields by one tokenizer.
///
/// The logical length always advances on append; the backing storage only
/// does when `store` is set, which lets a skip traversal run the identical
/// state machine without a single buffer write.
#[derive(Debug)]
pub(crate) struct FieldBuffer {
    data: Vec<char>,
    len: usize,
    mark: Option<Mark>,
}

impl FieldBuffer {
    pub(crate) fn new() -> Self {
        Self {
            data: Vec::with_capacity(64),
            len: 0,
            mark: None,
        }
    }

    /// Appends one character. Appending past the marked range permanently
    /// invalidates the mark: the tentative run has become ordinary content.
    #[inline]
    pub(crate) fn append(&mut self, ch: char, store: bool) {
        self.len += 1;
        if store {
            self.data.push(ch);
        }
        if let Some(mark) = self.mark {
            if self.len > mark.pos + mark.len {
                self.mark = None;
            }
        }
    }

    /// Starts a fresh mark at the current end, covering the next append.
    pub(crate) fn mark(&mut self) {
        self.mark = Some(Mark { pos: self.len, len: 1 });
    }

    /// Lengthens an active mark by one position. Only meaningful immediately
    /// before the next append extends the tentative run.
    pub(crate) fn extend_mark(&mut self) {
        if let Some(mark) = &mut self.mark {
            mark.len += 1;
        }
    }

    /// Truncates back to the mark start if the cursor is still inside the
    /// marked range, then clears the mark. No-op when no mark is active.
    pub(crate) fn rollback_to_mark(&mut self) {
        if let Some(mark) = self.mark.take() {
            debug_assert!(self.len >= mark.pos && self.len <= mark.pos + mark.len);
            self.len = mark.pos;
            self.data.truncate(mark.pos.min(self.data.len()));
        }
    }

    /// Resets the buffer between fields.
    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.data.clear();
        self.mark = None;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The accumulated value, or `None` for a zero-length field. Only
    /// meaningful when the appends were stored.
    pub(crate) fn materialize(&self) -> Option<String> {
        if self.len == 0 {
            None
        } else {
            Some(self.data.iter().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldBuffer;

    #[test]
    fn append_and_materialize() {
        let mut buf = FieldBuffer::new();
        buf.append('h', true);
        buf.append('i', true);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.materialize(), Some("hi".into()));
    }

    #[test]
    fn zero_length_field_is_the_empty_sentinel() {
        let buf = FieldBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.materialize(), None);
    }

    #[test]
    fn rollback_discards_the_trailing_run() {
        let mut buf = FieldBuffer::new();
        buf.append('a', true);
        buf.mark();
        buf.append(' ', true);
        buf.extend_mark();
        buf.append(' ', true);
        buf.rollback_to_mark();
        assert_eq!(buf.materialize(), Some("a".into()));
        // The mark is gone; a second rollback changes nothing.
        buf.append('b', true);
        buf.rollback_to_mark();
        assert_eq!(buf.materialize(), Some("ab".into()));
    }

    #[test]
    fn append_past_the_mark_invalidates_it() {
        let mut buf = FieldBuffer::new();
        buf.append('a', true);
        buf.mark();
        buf.append(' ', true);
        buf.append('b', true);
        buf.rollback_to_mark();
        assert_eq!(buf.materialize(), Some("a b".into()));
    }

    #[test]
    fn clear_resets_length_and_mark() {
        let mut buf = FieldBuffer::new();
        buf.append('x', true);
        buf.mark();
        buf.append(' ', true);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.materialize(), None);
        buf.append('y', true);
        buf.rollback_to_mark();
        assert_eq!(buf.materialize(), Some("y".into()));
    }

    #[test]
    fn unstored_appends_still_track_length() {
        let mut buf = FieldBuffer::new();
        buf.append('a', false);
        buf.mark();
        buf.append(' ', false);
        assert_eq!(buf.len(), 2);
        buf.rollback_to_mark();
        assert_eq!(buf.len(), 1);
        assert!(!buf.is_empty());
    }
}
