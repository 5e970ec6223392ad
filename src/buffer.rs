use core::cell::Cell;

// The buffer keeps the pattern as decoded code points followed by two NUL
// sentinels, so one code point of lookahead (and the two of `skip`) never
// needs an explicit end-of-input check. A literal NUL inside the pattern is
// told apart from a sentinel by comparing the cursor to `len`.

/// The number of NUL code points appended after the pattern.
const SENTINELS: usize = 2;

/// A cursor over the code points of a pattern.
///
/// Every method takes `&self`. The cursor lives in a `Cell` so that the
/// parser can hold a shared borrow of the buffer for its whole lifetime.
#[derive(Clone, Debug)]
pub(crate) struct Buffer {
    codepoints: Vec<char>,
    len: usize,
    pos: Cell<usize>,
}

impl Buffer {
    /// Decode the given pattern into a buffer positioned at its start.
    pub(crate) fn new(pattern: &str) -> Buffer {
        let mut codepoints: Vec<char> = pattern.chars().collect();
        let len = codepoints.len();
        codepoints.extend(core::iter::repeat('\0').take(SENTINELS));
        Buffer { codepoints, len, pos: Cell::new(0) }
    }

    /// The number of code points in the pattern, not counting sentinels.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The current cursor position.
    pub(crate) fn pos(&self) -> usize {
        self.pos.get()
    }

    /// Move the cursor to an arbitrary position. Used to unwind after a
    /// speculative read.
    pub(crate) fn set_pos(&self, pos: usize) {
        self.pos.set(pos);
    }

    /// Returns true when the cursor has consumed every pattern code point.
    pub(crate) fn is_done(&self) -> bool {
        self.pos() >= self.len
    }

    /// Return the code point at the given absolute index. Anything past the
    /// end reads as a NUL sentinel.
    pub(crate) fn at(&self, index: usize) -> char {
        self.codepoints.get(index).copied().unwrap_or('\0')
    }

    /// Return the code point under the cursor without moving.
    pub(crate) fn peek(&self) -> char {
        self.at(self.pos())
    }

    /// Return the code point under the cursor and advance past it.
    pub(crate) fn read(&self) -> char {
        let pos = self.pos();
        self.pos.set(pos + 1);
        self.at(pos)
    }

    /// Advance by one and return the code point now under the cursor.
    pub(crate) fn next(&self) -> char {
        let pos = self.pos() + 1;
        self.pos.set(pos);
        self.at(pos)
    }

    /// Return the code point after the one under the cursor and advance
    /// past both.
    pub(crate) fn skip(&self) -> char {
        let pos = self.pos();
        self.pos.set(pos + 2);
        self.at(pos + 1)
    }

    /// Step the cursor back by one.
    pub(crate) fn unread(&self) {
        self.pos.set(self.pos().saturating_sub(1));
    }

    /// Return the code points in `start..end` as a string. Out of range
    /// indices are clamped to the pattern.
    pub(crate) fn text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len);
        let start = start.min(end);
        self.codepoints[start..end].iter().collect()
    }
}
