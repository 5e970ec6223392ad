use regex_graph::{compile, CharPredicate, NodeId, NodeKind, Pattern};

mod errors;
mod invariants;
mod shapes;

/// Patterns that together exercise every construct the compiler supports.
const CORPUS: &[&str] = &[
    "",
    "a",
    "abc",
    "hello world",
    "a|b|c",
    "a||b",
    "(a|)",
    "ab*c",
    "a+?b*+c??",
    "x{3}y{2,}z{0,5}?w{1,1}+",
    "(ab|cd)+",
    "a{2}{3}",
    "(ab)*?",
    "(a(b(c)*)+)?",
    "()*",
    "(|a)+",
    "^\\d{4}-\\d{2}-\\d{2}$",
    "[a-z&&[^aeiou]]+",
    "[\\w.%+-]+@[\\w.-]+\\.[A-Za-z]{2,}",
    "\\bfoo\\B\\Aa\\z\\Z\\G\\R",
    "\\p{L}\\P{N}\\pL\\p{IsGreek}\\p{InBasic Latin}\\p{sc=Han}",
    "[\\p{Lu}\\p{Nd}_]*",
    "\\x{1F4A9}+\\uD83D\\uDCA9",
    "-?(0|[1-9]\\d*)(\\.\\d+)?([eE][+-]?\\d+)?",
];

fn cps(s: &str) -> Vec<u32> {
    s.chars().map(u32::from).collect()
}

/// Compile a pattern that should consist of exactly one character node and
/// return that node's predicate.
fn char_predicate(pattern: &str) -> CharPredicate {
    let pat = compile(pattern, false).unwrap();
    char_predicate_of(&pat)
}

fn char_predicate_of(pat: &Pattern) -> CharPredicate {
    let node = pat.node(pat.match_root());
    assert_eq!(node.next(), Some(NodeId::LAST_ACCEPT), "{}", pat);
    match *node.kind() {
        NodeKind::Char(ref p) | NodeKind::BmpChar(ref p) => p.clone(),
        ref kind => {
            panic!("{}: expected a character node, got {:?}", pat, kind)
        }
    }
}

/// Every code point up to U+3000 plus a sample of supplementary ones.
fn sample_code_points() -> impl Iterator<Item = u32> {
    (0..0x3000).chain([0x1F4A9, 0x10000, 0x20000, 0x10FFFF])
}
