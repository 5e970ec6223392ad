use {
    quickcheck::{QuickCheck, TestResult},
    regex_graph::{compile, Error, ErrorKind},
};

fn err(pattern: &str) -> Error {
    match compile(pattern, false) {
        Ok(pat) => panic!("{:?} should not compile, got {:?}", pattern, pat),
        Err(err) => err,
    }
}

#[test]
fn unclosed_constructs() {
    let e = err("(a");
    assert_eq!(*e.kind(), ErrorKind::UnclosedGroup);
    assert_eq!(e.offset(), 2);
    assert_eq!(e.pattern(), "(a");

    let e = err("[a");
    assert_eq!(*e.kind(), ErrorKind::UnclosedClass);

    let e = err("a{2,");
    assert_eq!(*e.kind(), ErrorKind::UnclosedCountedRepetition);
    assert_eq!(e.offset(), 4);
}

#[test]
fn message_points_at_offset() {
    assert_eq!(
        err("ab(cd").to_string(),
        "unclosed group near index 5\nab(cd\n     ^"
    );
    assert_eq!(
        err("a)").to_string(),
        "unmatched closing ')' near index 1\na)\n ^"
    );
    assert_eq!(
        err(r"\p{Lu").to_string(),
        "unclosed character family near index 5\n\\p{Lu\n     ^"
    );
}

#[test]
fn offsets_count_code_points() {
    // Each of these is a single code point but several bytes.
    let e = err("ééé(");
    assert_eq!(e.offset(), 4);
    assert!(e.to_string().ends_with("\nééé(\n    ^"), "{}", e);
}

#[test]
fn stray_characters_are_unmatched_parens() {
    for pattern in ["a)b", "(a))", "a|b)", ")", "[a])"] {
        let e = err(pattern);
        assert_eq!(*e.kind(), ErrorKind::UnmatchedClosingParen, "{}", pattern);
    }
}

#[test]
fn kinds() {
    use regex_graph::ErrorKind::*;

    let table: Vec<(&str, ErrorKind)> = vec![
        ("*a", DanglingQuantifier('*')),
        ("a|?", DanglingQuantifier('?')),
        ("(+)", DanglingQuantifier('+')),
        ("{", IllegalRepetition),
        ("(?:a)", DanglingQuantifier('?')),
        ("a{b}", IllegalRepetition),
        ("a{,3}", IllegalRepetition),
        ("a{5,2}", IllegalRepetitionRange),
        ("a{4294967296}", IllegalRepetitionRange),
        ("a{2", UnclosedCountedRepetition),
        ("a{2,3", UnclosedCountedRepetition),
        ("((a)", UnclosedGroup),
        ("a)", UnmatchedClosingParen),
        ("[a-", UnclosedClass),
        ("[a&&", UnclosedClass),
        ("[]", UnclosedClass),
        ("[z-a]", InvalidRange),
        (r"[a-\w]", InvalidRange),
        ("[&&]", BadClassSyntax),
        (r"[\A]", UnknownEscapeSequence),
        (r"\pQ", UnknownUnicodeProperty("Q".to_string())),
        (r"\p{IsKlingon}", UnknownUnicodeProperty("IsKlingon".into())),
        (r"\p{javaLower}", UnknownUnicodeProperty("javaLower".into())),
        (r"\p{Lu", UnclosedCharacterFamily),
        (r"\p{}", EmptyCharacterFamily),
        (r"\p", EmptyCharacterFamily),
        (r"\k", UnknownEscapeSequence),
        (r"\1", UnknownEscapeSequence),
        (r"\N{SNOWMAN}", UnknownEscapeSequence),
        (r"\ß", UnknownEscapeSequence),
        ("\\", UnknownEscapeSequence),
        (r"\08", IllegalOctalEscape),
        (r"\x4", IllegalHexEscape),
        (r"\x{}", IllegalHexEscape),
        (r"\x{110000}", HexCodePointTooBig),
        (r"\x{41", UnclosedHexEscape),
        (r"\u00g1", IllegalUnicodeEscape),
        (r"\c", IllegalControlEscape),
    ];
    for (pattern, kind) in table {
        let e = err(pattern);
        assert_eq!(*e.kind(), kind, "{:?}: {}", pattern, e);
        let len = pattern.chars().count();
        assert!(e.offset() <= len, "{:?}: {}", pattern, e);
    }
}

#[test]
fn nest_limit_covers_groups_and_classes() {
    let deep = format!("{}a{}", "(".repeat(300), ")".repeat(300));
    assert_eq!(*err(&deep).kind(), ErrorKind::NestLimitExceeded(250));

    let deep = format!("{}a{}", "[".repeat(300), "]".repeat(300));
    assert_eq!(*err(&deep).kind(), ErrorKind::NestLimitExceeded(250));

    let ok = format!("{}a{}", "(".repeat(250), ")".repeat(250));
    assert!(compile(&ok, false).is_ok());
}

#[test]
fn errors_are_std_errors() {
    fn assert_error(_: &(dyn std::error::Error + Send + Sync + 'static)) {}

    let e = err("(");
    assert_error(&e);
    let boxed: Box<dyn std::error::Error> = Box::new(e.clone());
    assert_eq!(boxed.to_string(), e.to_string());
}

/// Compiling any pattern built from meta characters either succeeds or
/// fails with an offset inside the pattern.
#[test]
fn arbitrary_patterns_fail_cleanly() {
    const ALPHABET: &[char] = &[
        'a', 'b', 'é', '0', '3', '9', ',', '-', '&', '^', '$', '.', '|',
        '(', ')', '[', ']', '{', '}', '*', '+', '?', '\\', 'p', 'P', 'd',
        'x', 'u', 'B', 'L',
    ];

    fn prop(indices: Vec<u8>) -> TestResult {
        let pattern: String = indices
            .iter()
            .map(|&i| ALPHABET[usize::from(i) % ALPHABET.len()])
            .collect();
        match compile(&pattern, false) {
            Ok(pat) => TestResult::from_bool(pat.as_str() == pattern),
            Err(e) => TestResult::from_bool(
                e.offset() <= pattern.chars().count()
                    && e.pattern() == pattern,
            ),
        }
    }
    QuickCheck::new()
        .tests(2_000)
        .quickcheck(prop as fn(Vec<u8>) -> TestResult);
}
