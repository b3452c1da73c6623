//! Bounded token buffers used by the markup parser.
use std::fmt;

/// Maximum number of characters in one lyrics line.
pub const MAX_TEXT_LEN: usize = 255;
/// Maximum number of characters in one chord name.
pub const MAX_CHORD_NAME_LEN: usize = 15;
/// Maximum number of characters in one directive.
pub const MAX_DIRECTIVE_LEN: usize = 255;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Text,
    ChordName,
    Directive,
}

impl BufferKind {
    pub fn capacity(self) -> usize {
        match self {
            BufferKind::Text => MAX_TEXT_LEN,
            BufferKind::ChordName => MAX_CHORD_NAME_LEN,
            BufferKind::Directive => MAX_DIRECTIVE_LEN,
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Text => write!(f, "lyrics line"),
            BufferKind::ChordName => write!(f, "chord name"),
            BufferKind::Directive => write!(f, "directive"),
        }
    }
}

/// Returned by [`BoundedBuffer::push`] for the first character that did not fit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Overflow(pub BufferKind);

/// A string buffer with a fixed character capacity.
///
/// Characters beyond the capacity are dropped. Only the first dropped
/// character of a token reports [`Overflow`]; the state resets on [`clear`].
///
/// [`clear`]: BoundedBuffer::clear
#[derive(Clone, Debug)]
pub struct BoundedBuffer {
    kind: BufferKind,
    text: String,
    len: usize,
    overflowed: bool,
}

impl BoundedBuffer {
    pub fn new(kind: BufferKind) -> Self {
        Self {
            kind,
            text: String::new(),
            len: 0,
            overflowed: false,
        }
    }

    pub fn push(&mut self, ch: char) -> Result<(), Overflow> {
        if self.len < self.kind.capacity() {
            self.text.push(ch);
            self.len += 1;
            return Ok(());
        }
        if self.overflowed {
            return Ok(());
        }
        self.overflowed = true;
        Err(Overflow(self.kind))
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.len = 0;
        self.overflowed = false;
    }

    /// Number of characters stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Take the contents, leaving the buffer empty and ready for a new token.
    pub fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.clear();
        text
    }
}
