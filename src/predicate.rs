/*!
Character predicates: boolean functions over a single code point.

A [`CharPredicate`] is built from primitive tests (a literal, a range, an
ASCII class, a Unicode category, script, block or binary property) and
combined with [`CharPredicate::and`], [`CharPredicate::union`],
[`CharPredicate::union3`] and [`CharPredicate::negate`]. Combinators keep
their operands as a tree and evaluate it lazily, so testing a union stops at
the first operand that matches and testing an intersection stops at the first
that doesn't.

Every predicate also carries a *BMP* tag. A predicate is BMP tagged when it
can never match a surrogate or a supplementary code point, which lets a
matcher test it against a single UTF-16 code unit. Primitive predicates are
tagged when their definition guarantees it. A combination of two tagged
predicates is tagged, and everything else (negation in particular) is not.
*/

use core::fmt;

use icu_properties::Script;

use crate::unicode::{self, Block, Property};

/// A boolean function over a single code point.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CharPredicate {
    kind: PredicateKind,
    bmp: bool,
}

/// The shape of a character predicate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PredicateKind {
    /// Matches every code point.
    Any,
    /// Matches exactly one code point.
    Literal(u32),
    /// Matches every code point whose case fold is the given (already
    /// folded) code point.
    Folded(u32),
    /// Matches an inclusive range of code points.
    Range(u32, u32),
    /// Matches a code point when it, its upper case mapping or the lower case
    /// mapping of that falls inside the inclusive range.
    FoldedRange(u32, u32),
    /// An ASCII only class such as `\d`.
    Ascii(AsciiClass),
    /// Any vertical whitespace, `\v`.
    VerticalSpace,
    /// Any horizontal whitespace, `\h`.
    HorizontalSpace,
    /// A set of general categories, as a mask of category bits.
    Category(u32),
    /// A script, along with the name it was requested by.
    Script { script: Script, name: String },
    /// A Unicode block.
    Block(Block),
    /// A binary Unicode property.
    Property(Property),
    /// Matches when both operands match.
    And(Box<CharPredicate>, Box<CharPredicate>),
    /// Matches when any operand matches.
    Union(Vec<CharPredicate>),
    /// Matches when the operand does not.
    Not(Box<CharPredicate>),
}

/// The ASCII character classes. None of them match anything outside ASCII.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AsciiClass {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Punct,
    Space,
    Word,
    XDigit,
}

impl AsciiClass {
    fn contains(self, cp: u32) -> bool {
        let Ok(b) = u8::try_from(cp) else { return false };
        if !b.is_ascii() {
            return false;
        }
        match self {
            AsciiClass::Alnum => b.is_ascii_alphanumeric(),
            AsciiClass::Alpha => b.is_ascii_alphabetic(),
            AsciiClass::Blank => b == b' ' || b == b'\t',
            AsciiClass::Cntrl => b.is_ascii_control(),
            AsciiClass::Digit => b.is_ascii_digit(),
            AsciiClass::Graph => b.is_ascii_graphic(),
            AsciiClass::Punct => b.is_ascii_punctuation(),
            // Unlike `u8::is_ascii_whitespace`, this includes \x0B.
            AsciiClass::Space => b == b' ' || (b'\t'..=b'\r').contains(&b),
            AsciiClass::Word => b.is_ascii_alphanumeric() || b == b'_',
            AsciiClass::XDigit => b.is_ascii_hexdigit(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            AsciiClass::Alnum => "ALNUM",
            AsciiClass::Alpha => "ALPHA",
            AsciiClass::Blank => "BLANK",
            AsciiClass::Cntrl => "CNTRL",
            AsciiClass::Digit => "DIGIT",
            AsciiClass::Graph => "GRAPH",
            AsciiClass::Punct => "PUNCT",
            AsciiClass::Space => "SPACE",
            AsciiClass::Word => "WORD",
            AsciiClass::XDigit => "XDIGIT",
        }
    }
}

/// Returns true if no code point in the range is a surrogate or outside the
/// basic multilingual plane.
fn is_bmp_range(lo: u32, hi: u32) -> bool {
    hi < 0xD800 || (lo > 0xDFFF && hi < 0x10000)
}

/// Constructors.
impl CharPredicate {
    fn new(kind: PredicateKind, bmp: bool) -> CharPredicate {
        CharPredicate { kind, bmp }
    }

    /// Matches every code point. Used for `.` and `\p{all}`.
    pub fn any() -> CharPredicate {
        CharPredicate::new(PredicateKind::Any, false)
    }

    /// Matches exactly `cp`.
    pub fn literal(cp: u32) -> CharPredicate {
        CharPredicate::new(PredicateKind::Literal(cp), is_bmp_range(cp, cp))
    }

    /// Matches every code point that folds to `folded`. The argument must
    /// already be folded.
    pub fn folded(folded: u32) -> CharPredicate {
        CharPredicate::new(PredicateKind::Folded(folded), false)
    }

    /// Matches the inclusive range `lo..=hi`.
    pub fn range(lo: u32, hi: u32) -> CharPredicate {
        CharPredicate::new(PredicateKind::Range(lo, hi), is_bmp_range(lo, hi))
    }

    /// Matches the inclusive range `lo..=hi` case insensitively.
    pub fn folded_range(lo: u32, hi: u32) -> CharPredicate {
        CharPredicate::new(PredicateKind::FoldedRange(lo, hi), false)
    }

    /// Matches one of the ASCII classes.
    pub fn ascii(class: AsciiClass) -> CharPredicate {
        CharPredicate::new(PredicateKind::Ascii(class), true)
    }

    /// Matches vertical whitespace: `\n`, `\x0B`, `\f`, `\r`, NEL and the
    /// line and paragraph separators.
    pub fn vertical_space() -> CharPredicate {
        CharPredicate::new(PredicateKind::VerticalSpace, true)
    }

    /// Matches horizontal whitespace: tab, space and the Unicode space
    /// separators that don't end a line.
    pub fn horizontal_space() -> CharPredicate {
        CharPredicate::new(PredicateKind::HorizontalSpace, true)
    }

    /// Matches code points whose general category bit is set in `mask`.
    pub fn category(mask: u32) -> CharPredicate {
        CharPredicate::new(PredicateKind::Category(mask), false)
    }

    /// Matches the code points of the named script. Returns `None` when no
    /// script goes by that name.
    pub fn script(name: &str) -> Option<CharPredicate> {
        let script = unicode::script_by_name(name)?;
        let kind = PredicateKind::Script { script, name: name.to_string() };
        Some(CharPredicate::new(kind, false))
    }

    /// Matches the code points of the named block. Returns `None` when no
    /// block goes by that name.
    pub fn block(name: &str) -> Option<CharPredicate> {
        let block = unicode::block_by_name(name)?;
        Some(CharPredicate::new(PredicateKind::Block(block), false))
    }

    fn property(property: Property) -> CharPredicate {
        CharPredicate::new(PredicateKind::Property(property), false)
    }

    /// Resolve a binary property name, the way `\p{IsAlphabetic}` does.
    ///
    /// Names are matched case insensitively. When `case_insensitive` is set,
    /// each of the cased letter properties widens to all three of them.
    pub fn unicode_property(
        name: &str,
        case_insensitive: bool,
    ) -> Option<CharPredicate> {
        let property = Property::from_upper_name(&name.to_uppercase())?;
        let pred = CharPredicate::property(property);
        if !(case_insensitive && property.is_cased()) {
            return Some(pred);
        }
        let (a, b) = match property {
            Property::Lowercase => (Property::Uppercase, Property::Titlecase),
            Property::Uppercase => (Property::Lowercase, Property::Titlecase),
            _ => (Property::Lowercase, Property::Uppercase),
        };
        let (a, b) = (CharPredicate::property(a), CharPredicate::property(b));
        Some(pred.union3(a, b))
    }

    /// Resolve a general category or POSIX class name, the way `\p{Lu}`,
    /// `\pL` or `\p{Alpha}` do. These names are case sensitive.
    pub fn named(name: &str, case_insensitive: bool) -> Option<CharPredicate> {
        if let Some(mask) = unicode::category_mask(name, case_insensitive) {
            return Some(CharPredicate::category(mask));
        }
        let pred = match name {
            "L1" => CharPredicate::range(0x00, 0xFF),
            "all" => CharPredicate::any(),
            "ASCII" => CharPredicate::range(0x00, 0x7F),
            "Alnum" => CharPredicate::ascii(AsciiClass::Alnum),
            "Alpha" => CharPredicate::ascii(AsciiClass::Alpha),
            "Blank" => CharPredicate::ascii(AsciiClass::Blank),
            "Cntrl" => CharPredicate::ascii(AsciiClass::Cntrl),
            "Digit" => CharPredicate::range(0x30, 0x39),
            "Graph" => CharPredicate::ascii(AsciiClass::Graph),
            "Lower" if case_insensitive => {
                CharPredicate::ascii(AsciiClass::Alpha)
            }
            "Lower" => CharPredicate::range(0x61, 0x7A),
            "Print" => CharPredicate::range(0x20, 0x7E),
            "Punct" => CharPredicate::ascii(AsciiClass::Punct),
            "Space" => CharPredicate::ascii(AsciiClass::Space),
            "Upper" if case_insensitive => {
                CharPredicate::ascii(AsciiClass::Alpha)
            }
            "Upper" => CharPredicate::range(0x41, 0x5A),
            "XDigit" => CharPredicate::ascii(AsciiClass::XDigit),
            _ => return None,
        };
        Some(pred)
    }
}

/// Combinators and accessors.
impl CharPredicate {
    /// Returns the shape of this predicate.
    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    /// Returns true if this predicate can never match a surrogate or a
    /// supplementary code point.
    pub fn is_bmp(&self) -> bool {
        self.bmp
    }

    /// Matches when both `self` and `other` match.
    pub fn and(self, other: CharPredicate) -> CharPredicate {
        let bmp = self.bmp && other.bmp;
        let kind = PredicateKind::And(Box::new(self), Box::new(other));
        CharPredicate::new(kind, bmp)
    }

    /// Matches when either `self` or `other` matches.
    pub fn union(self, other: CharPredicate) -> CharPredicate {
        let bmp = self.bmp && other.bmp;
        CharPredicate::new(PredicateKind::Union(vec![self, other]), bmp)
    }

    /// Matches when any of `self`, `a` or `b` matches.
    ///
    /// Like [`CharPredicate::union`], the result is BMP only exactly when
    /// every operand is.
    pub fn union3(self, a: CharPredicate, b: CharPredicate) -> CharPredicate {
        let bmp = self.bmp && a.bmp && b.bmp;
        CharPredicate::new(PredicateKind::Union(vec![self, a, b]), bmp)
    }

    /// Matches when `self` does not.
    pub fn negate(self) -> CharPredicate {
        CharPredicate::new(PredicateKind::Not(Box::new(self)), false)
    }

    /// Evaluate this predicate against a code point.
    pub fn test(&self, cp: u32) -> bool {
        match self.kind {
            PredicateKind::Any => true,
            PredicateKind::Literal(c) => c == cp,
            PredicateKind::Folded(lower) => {
                lower == cp || lower == unicode::fold(cp)
            }
            PredicateKind::Range(lo, hi) => lo <= cp && cp <= hi,
            PredicateKind::FoldedRange(lo, hi) => {
                let within = |c: u32| lo <= c && c <= hi;
                if within(cp) {
                    return true;
                }
                let upper = unicode::simple_upper(cp);
                within(upper) || within(unicode::simple_lower(upper))
            }
            PredicateKind::Ascii(class) => class.contains(cp),
            PredicateKind::VerticalSpace => {
                (0x0A..=0x0D).contains(&cp)
                    || cp == 0x85
                    || cp == 0x2028
                    || cp == 0x2029
            }
            PredicateKind::HorizontalSpace => matches!(
                cp,
                0x09 | 0x20
                    | 0xA0
                    | 0x1680
                    | 0x180E
                    | 0x2000..=0x200A
                    | 0x202F
                    | 0x205F
                    | 0x3000
            ),
            PredicateKind::Category(mask) => unicode::in_categories(mask, cp),
            PredicateKind::Script { script, .. } => {
                unicode::is_script(script, cp)
            }
            PredicateKind::Block(block) => block.contains(cp),
            PredicateKind::Property(property) => property.contains(cp),
            PredicateKind::And(ref a, ref b) => a.test(cp) && b.test(cp),
            PredicateKind::Union(ref preds) => {
                preds.iter().any(|p| p.test(cp))
            }
            PredicateKind::Not(ref p) => !p.test(cp),
        }
    }
}

impl fmt::Display for CharPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PredicateKind::Any => write!(f, "ALL"),
            PredicateKind::Literal(cp) => write_cp(f, cp),
            PredicateKind::Folded(cp) => {
                write!(f, "fold(")?;
                write_cp(f, cp)?;
                write!(f, ")")
            }
            PredicateKind::Range(lo, hi) => {
                write_cp(f, lo)?;
                write!(f, "-")?;
                write_cp(f, hi)
            }
            PredicateKind::FoldedRange(lo, hi) => {
                write!(f, "fold(")?;
                write_cp(f, lo)?;
                write!(f, "-")?;
                write_cp(f, hi)?;
                write!(f, ")")
            }
            PredicateKind::Ascii(class) => write!(f, "ASCII.{}", class.name()),
            PredicateKind::VerticalSpace => write!(f, "VertWS"),
            PredicateKind::HorizontalSpace => write!(f, "HorizWS"),
            PredicateKind::Category(mask) => {
                write!(f, "gc=")?;
                unicode::fmt_categories(mask, f)
            }
            PredicateKind::Script { ref name, .. } => write!(f, "sc={}", name),
            PredicateKind::Block(block) => write!(f, "blk={}", block.name()),
            PredicateKind::Property(property) => {
                write!(f, "Is{}", property.name())
            }
            PredicateKind::And(ref a, ref b) => write!(f, "({} && {})", a, b),
            PredicateKind::Union(ref preds) => {
                write!(f, "(")?;
                for (i, p) in preds.iter().enumerate() {
                    if i > 0 {
                        write!(f, " || ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
            PredicateKind::Not(ref p) => write!(f, "!{}", p),
        }
    }
}

/// Write a code point as a quoted character when it is printable ASCII and
/// as `\u{..}` otherwise.
fn write_cp(f: &mut fmt::Formatter<'_>, cp: u32) -> fmt::Result {
    match char::from_u32(cp) {
        Some(c) if c.is_ascii_graphic() || c == ' ' => write!(f, "{:?}", c),
        _ => write!(f, "'\\u{{{:X}}}'", cp),
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{QuickCheck, Testable};

    use super::*;

    fn qc<T: Testable>(t: T) {
        QuickCheck::new().tests(2_000).max_tests(4_000).quickcheck(t);
    }

    fn c(ch: char) -> u32 {
        u32::from(ch)
    }

    fn range(a: char, b: char) -> CharPredicate {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        CharPredicate::range(c(lo), c(hi))
    }

    #[test]
    fn double_negation() {
        fn prop(a: char, b: char, x: char) -> bool {
            let p = range(a, b);
            p.clone().negate().negate().test(c(x)) == p.test(c(x))
        }
        qc(prop as fn(char, char, char) -> bool);
    }

    #[test]
    fn union_commutes() {
        fn prop(a: char, b: char, d: char, e: char, x: char) -> bool {
            let (p, q) = (range(a, b), range(d, e));
            p.clone().union(q.clone()).test(c(x)) == q.union(p).test(c(x))
        }
        qc(prop as fn(char, char, char, char, char) -> bool);
    }

    #[test]
    fn de_morgan() {
        fn prop(a: char, b: char, d: char, e: char, x: char) -> bool {
            let (p, q) = (range(a, b), range(d, e));
            let lhs = p.clone().union(q.clone()).negate();
            let rhs = p.negate().and(q.negate());
            lhs.test(c(x)) == rhs.test(c(x))
        }
        qc(prop as fn(char, char, char, char, char) -> bool);
    }

    #[test]
    fn bmp_tags() {
        assert!(CharPredicate::literal(c('a')).is_bmp());
        assert!(!CharPredicate::literal(0xD800).is_bmp());
        assert!(!CharPredicate::literal(0x1F4A9).is_bmp());
        assert!(CharPredicate::range(c('a'), c('z')).is_bmp());
        assert!(CharPredicate::range(0xE000, 0xFFFF).is_bmp());
        assert!(!CharPredicate::range(0x00, 0xFFFF).is_bmp());
        assert!(!CharPredicate::range(0xE000, 0x10000).is_bmp());
        assert!(CharPredicate::ascii(AsciiClass::Digit).is_bmp());
        assert!(CharPredicate::vertical_space().is_bmp());
        assert!(!CharPredicate::any().is_bmp());
        assert!(!CharPredicate::folded(c('a')).is_bmp());
        assert!(!CharPredicate::category(unicode::gc::Lu).is_bmp());
    }

    #[test]
    fn bmp_tags_compose() {
        let bmp = || CharPredicate::ascii(AsciiClass::Word);
        let wide = || CharPredicate::category(unicode::gc::L);
        assert!(bmp().union(bmp()).is_bmp());
        assert!(bmp().and(bmp()).is_bmp());
        assert!(!bmp().union(wide()).is_bmp());
        assert!(!wide().and(bmp()).is_bmp());
        assert!(bmp().union3(bmp(), bmp()).is_bmp());
        assert!(!bmp().union3(bmp(), wide()).is_bmp());
        assert!(!bmp().negate().is_bmp());
    }

    #[test]
    fn short_circuit_shapes() {
        let p = range('a', 'c').union3(range('x', 'z'), CharPredicate::any());
        assert!(p.test(c('b')));
        assert!(p.test(c('!')));
        let q = range('a', 'z').and(range('m', 'p').negate());
        assert!(q.test(c('a')));
        assert!(!q.test(c('n')));
        assert!(!q.test(c('A')));
    }

    #[test]
    fn folded() {
        let p = CharPredicate::folded(c('k'));
        assert!(p.test(c('k')));
        assert!(p.test(c('K')));
        // KELVIN SIGN folds to 'k'.
        assert!(p.test(0x212A));
        assert!(!p.test(c('x')));

        let r = CharPredicate::folded_range(c('a'), c('f'));
        assert!(r.test(c('C')));
        assert!(!r.test(c('G')));
    }

    #[test]
    fn ascii_classes() {
        let space = CharPredicate::ascii(AsciiClass::Space);
        assert!(space.test(0x0B));
        assert!(!space.test(0xA0));
        let word = CharPredicate::ascii(AsciiClass::Word);
        assert!(word.test(c('_')));
        assert!(!word.test(c('é')));
        let punct = CharPredicate::ascii(AsciiClass::Punct);
        assert!(punct.test(c('~')));
        assert!(!punct.test(c('a')));
    }

    #[test]
    fn whitespace() {
        let v = CharPredicate::vertical_space();
        assert!(v.test(0x0B));
        assert!(v.test(0x2029));
        assert!(!v.test(0x09));
        let h = CharPredicate::horizontal_space();
        assert!(h.test(0x09));
        assert!(h.test(0x2005));
        assert!(!h.test(0x0A));
    }

    #[test]
    fn named() {
        let lu = CharPredicate::named("Lu", false).unwrap();
        assert!(lu.test(c('Q')));
        assert!(!lu.test(c('q')));
        let lu_ci = CharPredicate::named("Lu", true).unwrap();
        assert!(lu_ci.test(c('q')));
        let lower = CharPredicate::named("Lower", false).unwrap();
        assert!(lower.test(c('q')) && !lower.test(c('Q')));
        let lower_ci = CharPredicate::named("Lower", true).unwrap();
        assert!(lower_ci.test(c('Q')));
        assert!(CharPredicate::named("L1", false).unwrap().test(0xFF));
        assert!(CharPredicate::named("all", false).unwrap().test(0x10FFFF));
        assert_eq!(CharPredicate::named("lu", false), None);
        assert_eq!(CharPredicate::named("Bogus", false), None);
    }

    #[test]
    fn unicode_property() {
        let alpha = CharPredicate::unicode_property("alphabetic", false);
        assert!(alpha.unwrap().test(c('ж')));
        let lower = CharPredicate::unicode_property("Lowercase", false);
        assert!(!lower.unwrap().test(c('Ж')));
        let lower_ci = CharPredicate::unicode_property("Lowercase", true);
        let lower_ci = lower_ci.unwrap();
        assert!(lower_ci.test(c('Ж')));
        assert!(matches!(
            lower_ci.kind(),
            PredicateKind::Union(v) if v.len() == 3
        ));
        assert_eq!(CharPredicate::unicode_property("Bogus", false), None);
    }

    #[test]
    fn scripts_and_blocks() {
        let greek = CharPredicate::script("Greek").unwrap();
        assert!(greek.test(c('Ω')));
        assert!(!greek.test(c('O')));
        assert_eq!(greek.to_string(), "sc=Greek");
        assert_eq!(CharPredicate::script("Elvish"), None);

        let basic = CharPredicate::block("BasicLatin").unwrap();
        assert!(basic.test(c('~')));
        assert!(!basic.test(0x80));
        assert_eq!(basic.to_string(), "blk=Basic Latin");
    }

    #[test]
    fn display() {
        let p = range('a', 'z').and(CharPredicate::literal(c('q')).negate());
        assert_eq!(p.to_string(), "('a'-'z' && !'q')");
        let d = CharPredicate::ascii(AsciiClass::Digit);
        assert_eq!(d.to_string(), "ASCII.DIGIT");
        let g = CharPredicate::category(unicode::gc::Lu | unicode::gc::Nd);
        assert_eq!(g.to_string(), "gc=Lu|Nd");
        assert_eq!(CharPredicate::literal(0x2028).to_string(), "'\\u{2028}'");
    }
}
