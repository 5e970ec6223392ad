use core::fmt;

/// An error that occurred while compiling a pattern.
///
/// Every failure aborts compilation. There is no partially compiled
/// `Pattern`: the caller either gets a complete graph or one of these.
///
/// The error records the pattern that failed, the code point offset at which
/// the parser gave up and the reason. Its `Display` impl renders all three,
/// with a caret pointing at the offending position:
///
/// ```
/// let err = regex_graph::compile("a{3,1}", false).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "illegal repetition range near index 5\na{3,1}\n     ^",
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    pattern: String,
    offset: usize,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pattern: &str, offset: usize) -> Error {
        Error { kind, pattern: pattern.to_string(), offset }
    }

    /// Return the type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The original pattern string in which this error occurred.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The offset, in code points, at which this error occurred.
    ///
    /// This is never greater than the number of code points in the pattern.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// The type of a pattern compilation error.
///
/// This enum may grow variants, so callers should not match on it
/// exhaustively.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A `(` was never closed.
    UnclosedGroup,
    /// A `[` was never closed.
    UnclosedClass,
    /// A `{m,n}` repetition is missing its closing `}`.
    UnclosedCountedRepetition,
    /// A counted repetition has `n < m`, or a count that overflows.
    IllegalRepetitionRange,
    /// A `{` that does not start a counted repetition (no leading digit).
    IllegalRepetition,
    /// A repetition operator with nothing to repeat.
    DanglingQuantifier(char),
    /// A `\p{..}` or `\P{..}` name that isn't known.
    UnknownUnicodeProperty(String),
    /// A `\p{..}` family missing its closing `}`.
    UnclosedCharacterFamily,
    /// A `\p{}` family with no name.
    EmptyCharacterFamily,
    /// An escape sequence that isn't supported in its context.
    UnknownEscapeSequence,
    /// A malformed `\0` octal escape.
    IllegalOctalEscape,
    /// A malformed `\x` hexadecimal escape.
    IllegalHexEscape,
    /// A `\x{..}` escape above U+10FFFF.
    HexCodePointTooBig,
    /// A `\x{..}` escape missing its closing `}`.
    UnclosedHexEscape,
    /// A `\u` escape without four hexadecimal digits.
    IllegalUnicodeEscape,
    /// A `\c` escape at the end of the pattern.
    IllegalControlEscape,
    /// A class range whose upper bound is below its lower bound, or whose
    /// endpoint is not a single character.
    InvalidRange,
    /// A class intersection with no operands, e.g., `[&&]`.
    BadClassSyntax,
    /// A character that cannot appear at this point of a class.
    ///
    /// The parser does not currently produce this: escapes that are illegal
    /// inside a class, like `[\b]`, report
    /// [`ErrorKind::UnknownEscapeSequence`] first.
    UnexpectedClassCharacter(char),
    /// A `)` without a matching `(`.
    UnmatchedClosingParen,
    /// Parsing stopped before the end of the pattern.
    ///
    /// The parser does not currently produce this: a top level expression
    /// only stops early at a `)`, which is reported as
    /// [`ErrorKind::UnmatchedClosingParen`].
    TrailingPatternCharacters,
    /// Groups or classes are nested deeper than the configured limit.
    NestLimitExceeded(u32),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} near index {}\n{}\n",
            self.kind, self.offset, self.pattern
        )?;
        // The caret lines up with the offending code point as long as the
        // pattern is rendered with one column per code point.
        for _ in 0..self.offset {
            f.write_str(" ")?;
        }
        f.write_str("^")
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::ErrorKind::*;
        match *self {
            UnclosedGroup => write!(f, "unclosed group"),
            UnclosedClass => write!(f, "unclosed character class"),
            UnclosedCountedRepetition => {
                write!(f, "unclosed counted closure")
            }
            IllegalRepetitionRange => write!(f, "illegal repetition range"),
            IllegalRepetition => write!(f, "illegal repetition"),
            DanglingQuantifier(c) => {
                write!(f, "dangling meta character '{}'", c)
            }
            UnknownUnicodeProperty(ref name) => {
                write!(f, "unknown character property name {{{}}}", name)
            }
            UnclosedCharacterFamily => write!(f, "unclosed character family"),
            EmptyCharacterFamily => write!(f, "empty character family"),
            UnknownEscapeSequence => {
                write!(f, "illegal/unsupported escape sequence")
            }
            IllegalOctalEscape => write!(f, "illegal octal escape sequence"),
            IllegalHexEscape => {
                write!(f, "illegal hexadecimal escape sequence")
            }
            HexCodePointTooBig => {
                write!(f, "hexadecimal codepoint is too big")
            }
            UnclosedHexEscape => {
                write!(f, "unclosed hexadecimal escape sequence")
            }
            IllegalUnicodeEscape => {
                write!(f, "illegal Unicode escape sequence")
            }
            IllegalControlEscape => {
                write!(f, "illegal control escape sequence")
            }
            InvalidRange => write!(f, "illegal character range"),
            BadClassSyntax => write!(f, "bad class syntax"),
            UnexpectedClassCharacter(c) => {
                write!(f, "unexpected character '{}'", c)
            }
            UnmatchedClosingParen => write!(f, "unmatched closing ')'"),
            TrailingPatternCharacters => {
                write!(f, "unexpected trailing pattern characters")
            }
            NestLimitExceeded(limit) => {
                write!(f, "exceeded the maximum nesting depth of {}", limit)
            }
        }
    }
}
