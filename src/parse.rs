use core::cell::{Cell, RefCell};

use crate::{
    buffer::Buffer,
    error::{Error, ErrorKind},
    graph::{Boundary, Graph, NodeId, NodeKind, Quantifier},
    pattern::Config,
    predicate::{AsciiClass, CharPredicate},
    unicode,
};

/// What an escape sequence turned out to be.
enum Escape {
    /// A single code point, to be appended to a literal run or used as a
    /// class member.
    Literal(u32),
    /// A node built outside of a class, e.g., for `\b` or `\d`.
    Node(NodeId),
    /// A predicate built inside of a class, e.g., for `\d` in `[\d_]`.
    Class(CharPredicate),
    /// A valid escape that isn't a single code point. Nothing was built
    /// because the caller only wanted to know what kind of escape it is.
    Deferred,
}

/// A recursive descent parser that compiles a pattern straight into a node
/// graph.
///
/// All state lives behind `Cell`/`RefCell`, so that every method can take
/// `&self`. One parser compiles exactly one pattern.
pub(crate) struct Parser<'a> {
    /// The configuration of the parser as given by the caller.
    config: Config,
    /// The pattern we're parsing as given by the caller.
    pattern: &'a str,
    /// The pattern decoded into code points, plus the cursor.
    buf: Buffer,
    /// The arena every node is allocated in.
    graph: RefCell<Graph>,
    /// The current nesting depth of groups and classes. Bounded by
    /// `config.nest_limit`.
    depth: Cell<u32>,
}

/// The parser's public interface.
impl<'a> Parser<'a> {
    pub(crate) fn new(config: Config, pattern: &'a str) -> Parser<'a> {
        Parser {
            config,
            pattern,
            buf: Buffer::new(pattern),
            graph: RefCell::new(Graph::new()),
            depth: Cell::new(0),
        }
    }

    /// Parse the entire pattern. On success, this returns the arena and the
    /// root of the anchored match graph, whose every path ends at
    /// `LastAccept`.
    pub(crate) fn parse(self) -> Result<(Graph, NodeId), Error> {
        trace!("parsing {:?}", self.pattern);
        let match_root = self.expr(NodeId::LAST_ACCEPT)?;
        if !self.buf.is_done() {
            // The only things that stop a top level expression early are an
            // extra ')' or a stray character.
            let kind = if self.buf.peek() == ')' {
                ErrorKind::UnmatchedClosingParen
            } else {
                ErrorKind::TrailingPatternCharacters
            };
            self.buf.next();
            return Err(self.error(kind));
        }
        Ok((self.graph.into_inner(), match_root))
    }
}

/// Low level helpers.
impl<'a> Parser<'a> {
    /// Create a new error at the current position. The offset points at the
    /// last code point consumed.
    fn error(&self, kind: ErrorKind) -> Error {
        let offset = self.buf.pos().saturating_sub(1).min(self.buf.len());
        Error::new(kind, self.pattern, offset)
    }

    /// Increments the nesting depth, or returns an error if the limit has
    /// been reached.
    fn increment_depth(&self) -> Result<u32, Error> {
        let old = self.depth.get();
        if old >= self.config.nest_limit {
            return Err(self.error(ErrorKind::NestLimitExceeded(
                self.config.nest_limit,
            )));
        }
        // OK because the depth never exceeds the limit, which is a u32.
        let new = old.checked_add(1).unwrap();
        self.depth.set(new);
        Ok(old)
    }

    /// Decrements the nesting depth.
    ///
    /// This panics if the current depth is 0.
    fn decrement_depth(&self) {
        let old = self.depth.get();
        // If this fails then the increments and decrements don't line up.
        let new = old.checked_sub(1).unwrap();
        self.depth.set(new);
    }

    fn add(&self, kind: NodeKind) -> NodeId {
        self.graph.borrow_mut().add(kind)
    }

    fn set_next(&self, id: NodeId, next: NodeId) {
        self.graph.borrow_mut().set_next(id, next);
    }

    fn next_of(&self, id: NodeId) -> Option<NodeId> {
        self.graph.borrow().node(id).next()
    }

    /// Build a single character node for the given predicate, picking the
    /// BMP variant when the predicate allows it.
    fn char_node(&self, predicate: CharPredicate) -> NodeId {
        if predicate.is_bmp() {
            self.add(NodeKind::BmpChar(predicate))
        } else {
            self.add(NodeKind::Char(predicate))
        }
    }

    /// The predicate for one literal code point, taking case insensitivity
    /// into account.
    fn single(&self, cp: u32) -> CharPredicate {
        if self.config.case_insensitive {
            let upper = unicode::simple_upper(cp);
            let lower = unicode::simple_lower(upper);
            if upper != lower {
                return CharPredicate::folded(lower);
            }
        }
        CharPredicate::literal(cp)
    }

    /// Build a literal run node.
    fn slice(&self, run: Vec<u32>) -> NodeId {
        if self.config.case_insensitive {
            let folded = run.into_iter().map(unicode::fold).collect();
            self.add(NodeKind::SliceFolded(folded))
        } else {
            self.add(NodeKind::Slice(run))
        }
    }
}

/// Expressions, sequences and atoms.
impl<'a> Parser<'a> {
    /// Parse alternatives separated by `|`, every one of which continues at
    /// `end`. A single alternative is returned as is.
    fn expr(&self, end: NodeId) -> Result<NodeId, Error> {
        let (first, first_tail) = self.sequence(end)?;
        if self.buf.peek() != '|' {
            return Ok(first);
        }
        let join = self.add(NodeKind::BranchJoin);
        self.set_next(join, end);
        let mut alternatives = vec![];
        let mut push = |head: NodeId, tail: Option<NodeId>| match tail {
            None => alternatives.push(None),
            Some(tail) => {
                self.set_next(tail, join);
                alternatives.push(Some(head));
            }
        };
        push(first, first_tail);
        while self.buf.peek() == '|' {
            self.buf.next();
            let (head, tail) = self.sequence(end)?;
            push(head, tail);
        }
        trace!("branch with {} alternatives", alternatives.len());
        Ok(self.add(NodeKind::Branch { alternatives, join }))
    }

    /// Parse a concatenation, stopping at `|`, `)` or the end of the
    /// pattern.
    ///
    /// Returns the head of the chain and its tail, whose successor is set to
    /// `end`. An empty sequence has no tail and its head is `end` itself.
    fn sequence(
        &self,
        end: NodeId,
    ) -> Result<(NodeId, Option<NodeId>), Error> {
        let mut head: Option<NodeId> = None;
        let mut tail: Option<NodeId> = None;
        let mut link = |first: NodeId, last: NodeId| {
            match tail {
                None => head = Some(first),
                Some(tail) => self.set_next(tail, first),
            }
            tail = Some(last);
        };
        loop {
            let node = match self.buf.peek() {
                '(' => {
                    // A group is linked as is, since any quantifier on it has
                    // already been applied.
                    let (group_head, group_tail) = self.group()?;
                    link(group_head, group_tail);
                    continue;
                }
                '[' => {
                    let predicate = self.class(true)?;
                    self.char_node(predicate)
                }
                '\\' => {
                    let ch = self.buf.next();
                    if ch == 'p' || ch == 'P' {
                        let predicate = self.family(ch == 'P')?;
                        self.char_node(predicate)
                    } else {
                        self.buf.unread();
                        self.atom()?
                    }
                }
                '^' => {
                    self.buf.next();
                    self.add(NodeKind::Begin)
                }
                '$' => {
                    self.buf.next();
                    self.add(NodeKind::Dollar)
                }
                '.' => {
                    self.buf.next();
                    self.char_node(CharPredicate::any())
                }
                '|' | ')' => break,
                '\0' if self.buf.is_done() => break,
                ch @ ('?' | '*' | '+') => {
                    self.buf.next();
                    return Err(self.error(ErrorKind::DanglingQuantifier(ch)));
                }
                _ => self.atom()?,
            };
            let node = self.closure(node)?;
            link(node, node);
        }
        match (head, tail) {
            (Some(head), Some(tail)) => {
                self.set_next(tail, end);
                Ok((head, Some(tail)))
            }
            _ => Ok((end, None)),
        }
    }

    /// Parse a run of literal code points, or a single escape that builds
    /// its own node.
    ///
    /// When the run is followed by a quantifier, its last code point is left
    /// for the next atom so that the quantifier applies to that code point
    /// alone. A run of one code point that is about to be quantified becomes
    /// a single character node.
    fn atom(&self) -> Result<NodeId, Error> {
        let mut run: Vec<u32> = vec![];
        // The position at which the last code point of the run started.
        let mut last = self.buf.pos();
        let mut quantified = false;
        let mut ch = self.buf.peek();
        loop {
            match ch {
                // An empty run is kept as an empty slice, so that `{3}` in
                // `a{2}{3}` repeats nothing rather than failing.
                '*' | '+' | '?' | '{' => {
                    match run.len() {
                        0 => {}
                        1 => quantified = true,
                        _ => {
                            self.buf.set_pos(last);
                            run.pop();
                        }
                    }
                    break;
                }
                '$' | '.' | '^' | '(' | '[' | '|' | ')' => break,
                '\0' if self.buf.is_done() => break,
                '\\' => {
                    let next = self.buf.next();
                    if next == 'p' || next == 'P' {
                        if !run.is_empty() {
                            self.buf.unread();
                            break;
                        }
                        let predicate = self.family(next == 'P')?;
                        return Ok(self.char_node(predicate));
                    }
                    self.buf.unread();
                    let start = self.buf.pos();
                    match self.escape(false, run.is_empty(), false)? {
                        Escape::Literal(cp) => {
                            last = start;
                            run.push(cp);
                            ch = self.buf.peek();
                        }
                        Escape::Node(id) => return Ok(id),
                        Escape::Class(_) | Escape::Deferred => {
                            self.buf.set_pos(start);
                            break;
                        }
                    }
                }
                _ => {
                    last = self.buf.pos();
                    run.push(u32::from(ch));
                    ch = self.buf.next();
                }
            }
        }
        match (quantified, run.as_slice()) {
            (true, &[cp]) => Ok(self.char_node(self.single(cp))),
            _ => Ok(self.slice(run)),
        }
    }
}

/// Escapes.
impl<'a> Parser<'a> {
    /// Parse an escape sequence. The cursor must be at the `\`.
    ///
    /// `inclass` rejects the anchor escapes. `create` asks for nodes and
    /// predicates to actually be built. `isrange` resolves `\v` to U+000B,
    /// since a range endpoint has to be a single code point.
    fn escape(
        &self,
        inclass: bool,
        create: bool,
        isrange: bool,
    ) -> Result<Escape, Error> {
        let ch = self.buf.skip();
        if self.buf.pos() > self.buf.len() {
            return Err(self.error(ErrorKind::UnknownEscapeSequence));
        }
        let escape = match ch {
            '0' => Escape::Literal(self.octal()?),
            'A' if !inclass => self.anchor(create, NodeKind::Begin),
            'B' if !inclass => {
                self.anchor(create, NodeKind::WordBoundary(Boundary::None))
            }
            'D' => self.class_escape(inclass, create, || {
                CharPredicate::ascii(AsciiClass::Digit).negate()
            }),
            'G' if !inclass => self.anchor(create, NodeKind::LastMatchEnd),
            'H' => self.class_escape(inclass, create, || {
                CharPredicate::horizontal_space().negate()
            }),
            'R' if !inclass => self.anchor(create, NodeKind::LineEnding),
            'S' => self.class_escape(inclass, create, || {
                CharPredicate::ascii(AsciiClass::Space).negate()
            }),
            'V' => self.class_escape(inclass, create, || {
                CharPredicate::vertical_space().negate()
            }),
            'W' => self.class_escape(inclass, create, || {
                CharPredicate::ascii(AsciiClass::Word).negate()
            }),
            'Z' if !inclass => self.anchor(create, NodeKind::Dollar),
            'a' => Escape::Literal(0x07),
            'b' if !inclass => {
                self.anchor(create, NodeKind::WordBoundary(Boundary::Both))
            }
            'c' => Escape::Literal(self.control()?),
            'd' => self.class_escape(inclass, create, || {
                CharPredicate::ascii(AsciiClass::Digit)
            }),
            'e' => Escape::Literal(0x1B),
            'f' => Escape::Literal(0x0C),
            'h' => self.class_escape(inclass, create, || {
                CharPredicate::horizontal_space()
            }),
            'n' => Escape::Literal(0x0A),
            'r' => Escape::Literal(0x0D),
            's' => self.class_escape(inclass, create, || {
                CharPredicate::ascii(AsciiClass::Space)
            }),
            't' => Escape::Literal(0x09),
            'u' => Escape::Literal(self.unicode_escape()?),
            'v' if isrange => Escape::Literal(0x0B),
            'v' => self.class_escape(inclass, create, || {
                CharPredicate::vertical_space()
            }),
            'w' => self.class_escape(inclass, create, || {
                CharPredicate::ascii(AsciiClass::Word)
            }),
            'x' => Escape::Literal(self.hex()?),
            'z' if !inclass => self.anchor(create, NodeKind::End),
            ch if ch.is_ascii() && !ch.is_ascii_alphanumeric() => {
                Escape::Literal(u32::from(ch))
            }
            _ => return Err(self.error(ErrorKind::UnknownEscapeSequence)),
        };
        Ok(escape)
    }

    fn anchor(&self, create: bool, kind: NodeKind) -> Escape {
        if !create {
            return Escape::Deferred;
        }
        Escape::Node(self.add(kind))
    }

    fn class_escape(
        &self,
        inclass: bool,
        create: bool,
        predicate: impl FnOnce() -> CharPredicate,
    ) -> Escape {
        if !create {
            return Escape::Deferred;
        }
        if inclass {
            Escape::Class(predicate())
        } else {
            Escape::Node(self.char_node(predicate()))
        }
    }

    /// Parse the digits of a `\0` escape: one or two octal digits, or three
    /// when the first is at most 3.
    fn octal(&self) -> Result<u32, Error> {
        let n = self.buf.read();
        let Some(n) = n.to_digit(8) else {
            return Err(self.error(ErrorKind::IllegalOctalEscape));
        };
        let Some(m) = self.buf.read().to_digit(8) else {
            self.buf.unread();
            return Ok(n);
        };
        match self.buf.read().to_digit(8) {
            Some(o) if n <= 3 => Ok(n * 64 + m * 8 + o),
            _ => {
                self.buf.unread();
                Ok(n * 8 + m)
            }
        }
    }

    /// Parse the letter of a `\c` escape.
    fn control(&self) -> Result<u32, Error> {
        if self.buf.is_done() {
            return Err(self.error(ErrorKind::IllegalControlEscape));
        }
        Ok(u32::from(self.buf.read()) ^ 0x40)
    }

    /// Parse the digits of a `\x` escape, either exactly two or any number
    /// between braces.
    fn hex(&self) -> Result<u32, Error> {
        let n = self.buf.read();
        if let Some(hi) = n.to_digit(16) {
            if let Some(lo) = self.buf.read().to_digit(16) {
                return Ok(hi * 16 + lo);
            }
        } else if n == '{' && self.buf.peek().is_ascii_hexdigit() {
            let mut cp: u32 = 0;
            let mut ch = self.buf.read();
            while let Some(digit) = ch.to_digit(16) {
                cp = cp * 16 + digit;
                if cp > 0x10FFFF {
                    return Err(self.error(ErrorKind::HexCodePointTooBig));
                }
                ch = self.buf.read();
            }
            if ch != '}' {
                return Err(self.error(ErrorKind::UnclosedHexEscape));
            }
            return Ok(cp);
        }
        Err(self.error(ErrorKind::IllegalHexEscape))
    }

    /// Parse the four digits of a `\u` escape. A high surrogate directly
    /// followed by an escaped low surrogate combines with it.
    fn unicode_escape(&self) -> Result<u32, Error> {
        let hi = self.four_hex_digits()?;
        if !(0xD800..=0xDBFF).contains(&hi) {
            return Ok(hi);
        }
        let start = self.buf.pos();
        if self.buf.read() == '\\' && self.buf.read() == 'u' {
            let lo = self.four_hex_digits()?;
            if (0xDC00..=0xDFFF).contains(&lo) {
                return Ok(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00));
            }
        }
        self.buf.set_pos(start);
        Ok(hi)
    }

    fn four_hex_digits(&self) -> Result<u32, Error> {
        let mut cp = 0;
        for _ in 0..4 {
            let Some(digit) = self.buf.read().to_digit(16) else {
                return Err(self.error(ErrorKind::IllegalUnicodeEscape));
            };
            cp = cp * 16 + digit;
        }
        Ok(cp)
    }
}

/// Character classes and families.
impl<'a> Parser<'a> {
    /// Parse a bracketed class. The cursor must be at the `[`, or, when
    /// `consume` is false, just before the first member of an intersection
    /// operand that has no brackets of its own.
    ///
    /// When `consume` is true the closing `]` is consumed.
    fn class(&self, consume: bool) -> Result<CharPredicate, Error> {
        self.increment_depth()?;
        let predicate = self.class_members(consume)?;
        self.decrement_depth();
        Ok(predicate)
    }

    fn class_members(&self, consume: bool) -> Result<CharPredicate, Error> {
        let mut prev: Option<CharPredicate> = None;
        let mut negated = false;
        let mut ch = self.buf.next();
        if ch == '^' && self.buf.at(self.buf.pos() - 1) == '[' {
            ch = self.buf.next();
            negated = true;
        }
        loop {
            match ch {
                '[' => {
                    let nested = self.class(true)?;
                    prev = Some(union(prev, nested));
                    ch = self.buf.peek();
                    continue;
                }
                '&' => {
                    ch = self.buf.next();
                    if ch == '&' {
                        ch = self.buf.next();
                        let mut right: Option<CharPredicate> = None;
                        while ch != ']' && ch != '&' {
                            if ch == '\0' && self.buf.is_done() {
                                return Err(
                                    self.error(ErrorKind::UnclosedClass)
                                );
                            }
                            let operand = if ch == '[' {
                                self.class(true)?
                            } else {
                                self.buf.unread();
                                self.class(false)?
                            };
                            right = Some(union(right, operand));
                            ch = self.buf.peek();
                        }
                        prev = match (prev, right) {
                            (None, None) => {
                                return Err(
                                    self.error(ErrorKind::BadClassSyntax)
                                )
                            }
                            (Some(left), None) => Some(left),
                            (None, Some(right)) => Some(right),
                            (Some(left), Some(right)) => Some(left.and(right)),
                        };
                        continue;
                    }
                    // A lone '&' is an ordinary member.
                    self.buf.unread();
                }
                '\0' if self.buf.is_done() => {
                    return Err(self.error(ErrorKind::UnclosedClass));
                }
                ']' => {
                    // A ']' before any member is an ordinary member.
                    if let Some(predicate) = prev.take() {
                        if consume {
                            self.buf.next();
                        }
                        trace!("class {}", predicate);
                        return Ok(if negated {
                            predicate.negate()
                        } else {
                            predicate
                        });
                    }
                }
                _ => {}
            }
            let member = self.range()?;
            prev = Some(union(prev, member));
            ch = self.buf.peek();
        }
    }

    /// Parse one class member: a code point, a range of code points, an
    /// escape or a family.
    fn range(&self) -> Result<CharPredicate, Error> {
        let ch = self.buf.peek();
        let lo = if ch == '\\' {
            let next = self.buf.next();
            if next == 'p' || next == 'P' {
                return self.family(next == 'P');
            }
            // `\v` means U+000B when it starts a range.
            let isrange = self.buf.at(self.buf.pos() + 1) == '-';
            self.buf.unread();
            match self.escape(true, true, isrange)? {
                Escape::Literal(cp) => cp,
                Escape::Class(predicate) => return Ok(predicate),
                Escape::Node(_) | Escape::Deferred => {
                    return Err(
                        self.error(ErrorKind::UnexpectedClassCharacter(next))
                    )
                }
            }
        } else {
            self.buf.next();
            u32::from(ch)
        };
        if self.buf.peek() == '-' {
            let end = self.buf.at(self.buf.pos() + 1);
            if end == '[' {
                return Ok(self.single(lo));
            }
            if end != ']' {
                let m = self.buf.next();
                if m == '\0' && self.buf.is_done() {
                    return Err(self.error(ErrorKind::UnclosedClass));
                }
                let hi = if m == '\\' {
                    match self.escape(true, false, true)? {
                        Escape::Literal(cp) => Some(cp),
                        _ => None,
                    }
                } else {
                    self.buf.next();
                    Some(u32::from(m))
                };
                return match hi {
                    Some(hi) if hi >= lo => Ok(self.class_range(lo, hi)),
                    _ => Err(self.error(ErrorKind::InvalidRange)),
                };
            }
        }
        Ok(self.single(lo))
    }

    fn class_range(&self, lo: u32, hi: u32) -> CharPredicate {
        if self.config.case_insensitive {
            CharPredicate::folded_range(lo, hi)
        } else {
            CharPredicate::range(lo, hi)
        }
    }

    /// Parse a `\p` or `\P` family. The cursor must be at the `p` or `P`.
    ///
    /// The family is either a single letter (`\pL`) or a braced name
    /// (`\p{Lu}`, `\p{IsLatin}`, `\p{sc=Greek}`).
    fn family(&self, negated: bool) -> Result<CharPredicate, Error> {
        let ch = self.buf.next();
        let name = if ch != '{' {
            if self.buf.is_done() {
                return Err(self.error(ErrorKind::EmptyCharacterFamily));
            }
            self.buf.read().to_string()
        } else {
            let start = self.buf.pos() + 1;
            loop {
                if self.buf.pos() + 1 >= self.buf.len() {
                    self.buf.set_pos(self.buf.len() + 1);
                    return Err(self.error(ErrorKind::UnclosedCharacterFamily));
                }
                if self.buf.next() == '}' {
                    break;
                }
            }
            let end = self.buf.pos();
            self.buf.next();
            if start == end {
                return Err(self.error(ErrorKind::EmptyCharacterFamily));
            }
            self.buf.text(start, end)
        };
        let predicate = self.family_predicate(&name).ok_or_else(|| {
            self.error(ErrorKind::UnknownUnicodeProperty(name.clone()))
        })?;
        trace!("family {:?} resolved to {}", name, predicate);
        Ok(if negated { predicate.negate() } else { predicate })
    }

    /// Resolve the name of a family to a predicate.
    fn family_predicate(&self, name: &str) -> Option<CharPredicate> {
        let ci = self.config.case_insensitive;
        if let Some((key, value)) = name.split_once('=') {
            return match &*key.to_lowercase() {
                "sc" | "script" => CharPredicate::script(value),
                "blk" | "block" => CharPredicate::block(value),
                "gc" | "general_category" => CharPredicate::named(value, ci),
                _ => None,
            };
        }
        if let Some(block) = name.strip_prefix("In") {
            return CharPredicate::block(block);
        }
        if let Some(short) = name.strip_prefix("Is") {
            return CharPredicate::unicode_property(short, ci)
                .or_else(|| CharPredicate::named(short, ci))
                .or_else(|| CharPredicate::script(short));
        }
        CharPredicate::named(name, ci)
    }
}

/// Groups and quantifiers.
impl<'a> Parser<'a> {
    /// Parse a parenthesized group along with any quantifier that follows
    /// it. The cursor must be at the `(`.
    ///
    /// Returns the head and tail of the resulting sub-graph. The tail's
    /// successor is for the caller to set.
    fn group(&self) -> Result<(NodeId, NodeId), Error> {
        self.increment_depth()?;
        self.buf.next();
        let end = self.add(NodeKind::GroupEnd);
        let head = self.add(NodeKind::GroupStart { end });
        let body = self.expr(end)?;
        self.set_next(head, body);
        if self.buf.read() != ')' {
            return Err(self.error(ErrorKind::UnclosedGroup));
        }
        self.decrement_depth();

        let node = self.closure(head)?;
        if node == head {
            return Ok((head, end));
        }
        if self.next_of(head) == Some(end) {
            // The body is empty, so there is nothing for a loop or a branch
            // to repeat. The quantifier node runs the empty group as its
            // atom.
            return Ok((node, node));
        }
        let kind = self.graph.borrow().node(node).kind().clone();
        let (min, max, quantifier) = match kind {
            NodeKind::Optional { quantifier, .. } => (0, Some(1), quantifier),
            NodeKind::Bounded { min, max, quantifier, .. } => {
                (min, max, quantifier)
            }
            _ => return Ok((node, node)),
        };
        if quantifier == Quantifier::Possessive {
            return Ok((node, node));
        }
        let mut graph = self.graph.borrow_mut();
        if matches!(graph.node(node).kind(), NodeKind::Optional { .. }) {
            let join = graph.add(NodeKind::BranchJoin);
            graph.set_next(end, join);
            let alternatives = if quantifier == Quantifier::Greedy {
                vec![Some(head), None]
            } else {
                vec![None, Some(head)]
            };
            graph.replace(node, NodeKind::Branch { alternatives, join });
            return Ok((node, join));
        }
        let looped = graph.add(if quantifier == Quantifier::Greedy {
            NodeKind::Loop { body: head, min, max }
        } else {
            NodeKind::LazyLoop { body: head, min, max }
        });
        graph.set_next(end, looped);
        graph.replace(node, NodeKind::Prolog { looped });
        graph.set_next(node, looped);
        Ok((node, looped))
    }

    /// Apply the quantifier following `prev`, if any, and return the
    /// resulting node.
    fn closure(&self, prev: NodeId) -> Result<NodeId, Error> {
        match self.buf.peek() {
            '?' => {
                let quantifier = self.quantifier();
                Ok(self.add(NodeKind::Optional { atom: prev, quantifier }))
            }
            '*' => self.unbounded(prev, 0),
            '+' => self.unbounded(prev, 1),
            '{' => {
                let mut ch = self.buf.skip();
                if !ch.is_ascii_digit() {
                    return Err(self.error(ErrorKind::IllegalRepetition));
                }
                let mut min: u32 = 0;
                while let Some(digit) = ch.to_digit(10) {
                    min = self.accumulate(min, digit)?;
                    ch = self.buf.read();
                }
                let max = if ch == ',' {
                    ch = self.buf.read();
                    if ch == '}' {
                        self.buf.unread();
                        return self.unbounded(prev, min);
                    }
                    let mut max: u32 = 0;
                    while let Some(digit) = ch.to_digit(10) {
                        max = self.accumulate(max, digit)?;
                        ch = self.buf.read();
                    }
                    max
                } else {
                    min
                };
                if ch != '}' {
                    return Err(
                        self.error(ErrorKind::UnclosedCountedRepetition)
                    );
                }
                if max < min {
                    return Err(self.error(ErrorKind::IllegalRepetitionRange));
                }
                self.buf.unread();
                let quantifier = self.quantifier();
                if min == 0 && max == 1 {
                    return Ok(
                        self.add(NodeKind::Optional { atom: prev, quantifier })
                    );
                }
                Ok(self.add(NodeKind::Bounded {
                    atom: prev,
                    min,
                    max: Some(max),
                    quantifier,
                }))
            }
            _ => Ok(prev),
        }
    }

    fn accumulate(&self, count: u32, digit: u32) -> Result<u32, Error> {
        count
            .checked_mul(10)
            .and_then(|count| count.checked_add(digit))
            .ok_or_else(|| self.error(ErrorKind::IllegalRepetitionRange))
    }

    /// Build an unbounded repetition of `prev` with the given minimum. The
    /// cursor must be at the last code point of the repetition operator.
    ///
    /// A greedy repetition of a single character node is turned into a
    /// character run in place.
    fn unbounded(&self, prev: NodeId, min: u32) -> Result<NodeId, Error> {
        let quantifier = self.quantifier();
        if quantifier == Quantifier::Greedy {
            let mut graph = self.graph.borrow_mut();
            if let NodeKind::Char(ref mut p) | NodeKind::BmpChar(ref mut p) =
                *graph.kind_mut(prev)
            {
                let predicate = core::mem::replace(p, CharPredicate::any());
                let run = NodeKind::GreedyCharRun { predicate, min };
                graph.replace(prev, run);
                return Ok(prev);
            }
        }
        Ok(self.add(NodeKind::Bounded {
            atom: prev,
            min,
            max: None,
            quantifier,
        }))
    }

    /// Consume the last code point of a repetition operator along with a
    /// `?` or `+` modifier after it.
    fn quantifier(&self) -> Quantifier {
        match self.buf.next() {
            '?' => {
                self.buf.next();
                Quantifier::Lazy
            }
            '+' => {
                self.buf.next();
                Quantifier::Possessive
            }
            _ => Quantifier::Greedy,
        }
    }
}

/// Union two class members, where the left one may not exist yet.
fn union(left: Option<CharPredicate>, right: CharPredicate) -> CharPredicate {
    match left {
        None => right,
        Some(left) => left.union(right),
    }
}
