/*!
Unicode data used by character predicates.

General categories, scripts and the binary properties come from the
`icu_properties` compiled data. Blocks come from a static range table in the
`blocks` module. Case mapping uses the simple (one to one) mappings.

General categories are handled as bit masks: each category owns one bit of a
`u32`, so a predicate over any set of categories is a single mask test.
*/

use icu_properties::{maps, sets, GeneralCategory, Script};

pub use self::blocks::Block;

mod blocks;

/// Bit masks for the thirty general categories.
#[allow(non_upper_case_globals)]
pub(crate) mod gc {
    pub(crate) const Lu: u32 = 1 << 0;
    pub(crate) const Ll: u32 = 1 << 1;
    pub(crate) const Lt: u32 = 1 << 2;
    pub(crate) const Lm: u32 = 1 << 3;
    pub(crate) const Lo: u32 = 1 << 4;
    pub(crate) const Mn: u32 = 1 << 5;
    pub(crate) const Mc: u32 = 1 << 6;
    pub(crate) const Me: u32 = 1 << 7;
    pub(crate) const Nd: u32 = 1 << 8;
    pub(crate) const Nl: u32 = 1 << 9;
    pub(crate) const No: u32 = 1 << 10;
    pub(crate) const Zs: u32 = 1 << 11;
    pub(crate) const Zl: u32 = 1 << 12;
    pub(crate) const Zp: u32 = 1 << 13;
    pub(crate) const Cc: u32 = 1 << 14;
    pub(crate) const Cf: u32 = 1 << 15;
    pub(crate) const Co: u32 = 1 << 16;
    pub(crate) const Cs: u32 = 1 << 17;
    pub(crate) const Cn: u32 = 1 << 18;
    pub(crate) const Pd: u32 = 1 << 19;
    pub(crate) const Ps: u32 = 1 << 20;
    pub(crate) const Pe: u32 = 1 << 21;
    pub(crate) const Pc: u32 = 1 << 22;
    pub(crate) const Po: u32 = 1 << 23;
    pub(crate) const Pi: u32 = 1 << 24;
    pub(crate) const Pf: u32 = 1 << 25;
    pub(crate) const Sm: u32 = 1 << 26;
    pub(crate) const Sc: u32 = 1 << 27;
    pub(crate) const Sk: u32 = 1 << 28;
    pub(crate) const So: u32 = 1 << 29;

    pub(crate) const LC: u32 = Lu | Ll | Lt;
    pub(crate) const L: u32 = LC | Lm | Lo;
    pub(crate) const M: u32 = Mn | Mc | Me;
    pub(crate) const N: u32 = Nd | Nl | No;
    pub(crate) const Z: u32 = Zs | Zl | Zp;
    pub(crate) const C: u32 = Cc | Cf | Co | Cs | Cn;
    pub(crate) const P: u32 = Pd | Ps | Pe | Pc | Po | Pi | Pf;
    pub(crate) const S: u32 = Sm | Sc | Sk | So;
    pub(crate) const LD: u32 = L | Nd;
}

/// Short names of each category bit, in bit order.
const CATEGORY_NAMES: [&str; 30] = [
    "Lu", "Ll", "Lt", "Lm", "Lo", "Mn", "Mc", "Me", "Nd", "Nl", "No", "Zs",
    "Zl", "Zp", "Cc", "Cf", "Co", "Cs", "Cn", "Pd", "Ps", "Pe", "Pc", "Po",
    "Pi", "Pf", "Sm", "Sc", "Sk", "So",
];

/// Return the category bit of the given code point.
///
/// Values that aren't code points at all are unassigned.
pub(crate) fn category_of(cp: u32) -> u32 {
    match maps::general_category().get32(cp) {
        GeneralCategory::UppercaseLetter => gc::Lu,
        GeneralCategory::LowercaseLetter => gc::Ll,
        GeneralCategory::TitlecaseLetter => gc::Lt,
        GeneralCategory::ModifierLetter => gc::Lm,
        GeneralCategory::OtherLetter => gc::Lo,
        GeneralCategory::NonspacingMark => gc::Mn,
        GeneralCategory::SpacingMark => gc::Mc,
        GeneralCategory::EnclosingMark => gc::Me,
        GeneralCategory::DecimalNumber => gc::Nd,
        GeneralCategory::LetterNumber => gc::Nl,
        GeneralCategory::OtherNumber => gc::No,
        GeneralCategory::SpaceSeparator => gc::Zs,
        GeneralCategory::LineSeparator => gc::Zl,
        GeneralCategory::ParagraphSeparator => gc::Zp,
        GeneralCategory::Control => gc::Cc,
        GeneralCategory::Format => gc::Cf,
        GeneralCategory::PrivateUse => gc::Co,
        GeneralCategory::Surrogate => gc::Cs,
        GeneralCategory::Unassigned => gc::Cn,
        GeneralCategory::DashPunctuation => gc::Pd,
        GeneralCategory::OpenPunctuation => gc::Ps,
        GeneralCategory::ClosePunctuation => gc::Pe,
        GeneralCategory::ConnectorPunctuation => gc::Pc,
        GeneralCategory::OtherPunctuation => gc::Po,
        GeneralCategory::InitialPunctuation => gc::Pi,
        GeneralCategory::FinalPunctuation => gc::Pf,
        GeneralCategory::MathSymbol => gc::Sm,
        GeneralCategory::CurrencySymbol => gc::Sc,
        GeneralCategory::ModifierSymbol => gc::Sk,
        GeneralCategory::OtherSymbol => gc::So,
        #[allow(unreachable_patterns)]
        _ => gc::Cn,
    }
}

/// Returns true if the given code point's category is in `mask`.
pub(crate) fn in_categories(mask: u32, cp: u32) -> bool {
    mask & category_of(cp) != 0
}

/// Resolve a general category name (a single category like `Lu` or a group
/// like `L`) to its mask.
///
/// In case insensitive mode, each of the cased letter categories stands for
/// all three of them.
pub(crate) fn category_mask(
    name: &str,
    case_insensitive: bool,
) -> Option<u32> {
    let mask = match name {
        "Lu" | "Ll" | "Lt" if case_insensitive => gc::LC,
        "L" => gc::L,
        "LC" => gc::LC,
        "LD" => gc::LD,
        "M" => gc::M,
        "N" => gc::N,
        "Z" => gc::Z,
        "C" => gc::C,
        "P" => gc::P,
        "S" => gc::S,
        _ => {
            let i = CATEGORY_NAMES.iter().position(|&n| n == name)?;
            1 << i
        }
    };
    Some(mask)
}

/// Write the names of every category in `mask`, separated by `|`.
pub(crate) fn fmt_categories(
    mask: u32,
    f: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    let mut first = true;
    for (i, name) in CATEGORY_NAMES.iter().enumerate() {
        if mask & (1 << i) == 0 {
            continue;
        }
        if !first {
            f.write_str("|")?;
        }
        first = false;
        f.write_str(name)?;
    }
    Ok(())
}

/// Look up a script by its long name or its four letter alias. The match
/// ignores case, spaces, hyphens and underscores.
pub(crate) fn script_by_name(name: &str) -> Option<Script> {
    Script::name_to_enum_mapper().get_loose(name)
}

/// Returns true if the given code point belongs to `script`.
pub(crate) fn is_script(script: Script, cp: u32) -> bool {
    maps::script().get32(cp) == script
}

/// Categories excluded from the `Graph` property.
const NOT_GRAPH: u32 = gc::Z | gc::Cc | gc::Cs | gc::Cn;

/// A named binary character property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Property {
    Alphabetic,
    Assigned,
    Control,
    Digit,
    HexDigit,
    Ideographic,
    JoinControl,
    Letter,
    Lowercase,
    NoncharacterCodePoint,
    Titlecase,
    Punctuation,
    Uppercase,
    WhiteSpace,
    Word,
    Alnum,
    Blank,
    Graph,
    Print,
}

impl Property {
    /// Resolve an upper cased property name. Both the Unicode names (with or
    /// without underscores) and the POSIX style short names are accepted.
    pub(crate) fn from_upper_name(name: &str) -> Option<Property> {
        use self::Property::*;

        Some(match name {
            "ALPHABETIC" | "ALPHA" => Alphabetic,
            "ASSIGNED" => Assigned,
            "CONTROL" | "CNTRL" => Control,
            "DIGIT" => Digit,
            "HEXDIGIT" | "HEX_DIGIT" | "XDIGIT" => HexDigit,
            "IDEOGRAPHIC" => Ideographic,
            "JOINCONTROL" | "JOIN_CONTROL" => JoinControl,
            "LETTER" => Letter,
            "LOWERCASE" | "LOWER" => Lowercase,
            "NONCHARACTERCODEPOINT" | "NONCHARACTER_CODE_POINT" => {
                NoncharacterCodePoint
            }
            "TITLECASE" => Titlecase,
            "PUNCTUATION" | "PUNCT" => Punctuation,
            "UPPERCASE" | "UPPER" => Uppercase,
            "WHITESPACE" | "WHITE_SPACE" | "SPACE" => WhiteSpace,
            "WORD" => Word,
            "ALNUM" => Alnum,
            "BLANK" => Blank,
            "GRAPH" => Graph,
            "PRINT" => Print,
            _ => return None,
        })
    }

    /// Returns true if the property is one of the three cased letter
    /// properties, which widen to each other in case insensitive mode.
    pub(crate) fn is_cased(self) -> bool {
        matches!(
            self,
            Property::Lowercase | Property::Uppercase | Property::Titlecase
        )
    }

    /// Returns true if the given code point has this property.
    pub(crate) fn contains(self, cp: u32) -> bool {
        use self::Property::*;

        match self {
            Alphabetic => sets::alphabetic().contains32(cp),
            Assigned => category_of(cp) != gc::Cn,
            Control => category_of(cp) == gc::Cc,
            Digit => category_of(cp) == gc::Nd,
            HexDigit => {
                category_of(cp) == gc::Nd || sets::hex_digit().contains32(cp)
            }
            Ideographic => sets::ideographic().contains32(cp),
            JoinControl => sets::join_control().contains32(cp),
            Letter => in_categories(gc::L, cp),
            Lowercase => sets::lowercase().contains32(cp),
            NoncharacterCodePoint => {
                sets::noncharacter_code_point().contains32(cp)
            }
            Titlecase => category_of(cp) == gc::Lt,
            Punctuation => in_categories(gc::P, cp),
            Uppercase => sets::uppercase().contains32(cp),
            WhiteSpace => {
                in_categories(gc::Z, cp)
                    || (0x09..=0x0D).contains(&cp)
                    || cp == 0x85
            }
            Word => {
                sets::alphabetic().contains32(cp)
                    || in_categories(gc::M | gc::Nd | gc::Pc, cp)
                    || sets::join_control().contains32(cp)
            }
            Alnum => {
                sets::alphabetic().contains32(cp) || category_of(cp) == gc::Nd
            }
            Blank => category_of(cp) == gc::Zs || cp == 0x09,
            Graph => !in_categories(NOT_GRAPH, cp),
            Print => {
                let graph = !in_categories(NOT_GRAPH, cp);
                let blank = category_of(cp) == gc::Zs || cp == 0x09;
                (graph || blank) && category_of(cp) != gc::Cc
            }
        }
    }

    /// The canonical name of this property.
    pub fn name(self) -> &'static str {
        use self::Property::*;

        match self {
            Alphabetic => "Alphabetic",
            Assigned => "Assigned",
            Control => "Control",
            Digit => "Digit",
            HexDigit => "Hex_Digit",
            Ideographic => "Ideographic",
            JoinControl => "Join_Control",
            Letter => "Letter",
            Lowercase => "Lowercase",
            NoncharacterCodePoint => "Noncharacter_Code_Point",
            Titlecase => "Titlecase",
            Punctuation => "Punctuation",
            Uppercase => "Uppercase",
            WhiteSpace => "White_Space",
            Word => "Word",
            Alnum => "Alnum",
            Blank => "Blank",
            Graph => "Graph",
            Print => "Print",
        }
    }
}

/// Look up a Unicode block by name.
pub(crate) fn block_by_name(name: &str) -> Option<Block> {
    Block::from_name(name)
}

/// Return the simple uppercase mapping of a code point, or the code point
/// itself when it has none.
///
/// The standard library only exposes the full mappings. Where a full mapping
/// is a single code point it agrees with the simple one, and where it
/// expands the simple mapping is the code point itself, except for the
/// Greek letters with ypogegrammeni handled here.
pub(crate) fn simple_upper(cp: u32) -> u32 {
    match cp {
        0x1F80..=0x1F87 | 0x1F90..=0x1F97 | 0x1FA0..=0x1FA7 => cp + 8,
        0x1FB3 | 0x1FC3 | 0x1FF3 => cp + 9,
        _ => match char::from_u32(cp) {
            None => cp,
            Some(c) => single(c.to_uppercase()).map_or(cp, u32::from),
        },
    }
}

/// Return the simple lowercase mapping of a code point, or the code point
/// itself when it has none.
///
/// U+0130 is the only code point whose full lowercase mapping expands while
/// its simple one does not.
pub(crate) fn simple_lower(cp: u32) -> u32 {
    match cp {
        0x0130 => 0x0069,
        _ => match char::from_u32(cp) {
            None => cp,
            Some(c) => single(c.to_lowercase()).map_or(cp, u32::from),
        },
    }
}

/// Fold a code point by mapping it to upper case and then the result to
/// lower case. Two code points match case insensitively when their folds
/// are equal.
pub(crate) fn fold(cp: u32) -> u32 {
    simple_lower(simple_upper(cp))
}

fn single<I: Iterator<Item = char>>(mut it: I) -> Option<char> {
    let c = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some(c)
}
