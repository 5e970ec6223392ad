use {
    anyhow::Result,
    quickcheck::{QuickCheck, TestResult},
    regex_graph::{compile, ErrorKind, Graph, NodeId, NodeKind, Quantifier},
};

use crate::cps;

fn kind(graph: &Graph, id: NodeId) -> &NodeKind {
    graph.node(id).kind()
}

fn next(graph: &Graph, id: NodeId) -> NodeId {
    graph.node(id).next().unwrap()
}

#[test]
fn literal_is_a_slice() -> Result<()> {
    let pat = compile("abc", false)?;
    let g = pat.graph();
    assert_eq!(*kind(g, pat.match_root()), NodeKind::Slice(cps("abc")));
    assert_eq!(next(g, pat.match_root()), NodeId::LAST_ACCEPT);
    assert_eq!(next(g, NodeId::LAST_ACCEPT), NodeId::ACCEPT);
    assert_eq!(*kind(g, pat.root()), NodeKind::Start);
    assert_eq!(next(g, pat.root()), pat.match_root());
    Ok(())
}

#[test]
fn long_literal_is_scanned_with_boyer_moore() -> Result<()> {
    let pat = compile("needle", false)?;
    let g = pat.graph();
    let NodeKind::BoyerMoore(ref bm) = *kind(g, pat.root()) else {
        panic!("expected a Boyer-Moore root, got {:?}", pat)
    };
    assert_eq!(bm.codepoints, cps("needle"));
    assert_eq!(bm.good_suffix.len(), 6);
    assert_eq!(bm.last_occurrence[usize::from(b'n')], 1);
    assert_eq!(bm.last_occurrence[usize::from(b'e')], 6);
    assert_eq!(next(g, pat.root()), NodeId::LAST_ACCEPT);
    // The anchored match still starts at the plain literal.
    assert_eq!(*kind(g, pat.match_root()), NodeKind::Slice(cps("needle")));
    Ok(())
}

#[test]
fn literal_prefix_keeps_its_successor() -> Result<()> {
    let pat = compile("abcd+", false)?;
    let g = pat.graph();
    assert_eq!(*kind(g, pat.match_root()), NodeKind::Slice(cps("abc")));
    assert!(matches!(kind(g, pat.root()), NodeKind::Start));

    let pat = compile("abcde+", false)?;
    let g = pat.graph();
    assert!(matches!(kind(g, pat.root()), NodeKind::BoyerMoore(_)));
    assert_eq!(next(g, pat.root()), next(g, pat.match_root()));
    Ok(())
}

#[test]
fn case_insensitive_literal_is_folded() -> Result<()> {
    let pat = compile("HeLLo", true)?;
    let g = pat.graph();
    assert_eq!(
        *kind(g, pat.match_root()),
        NodeKind::SliceFolded(cps("hello"))
    );
    // Folded runs are never scanned with Boyer-Moore.
    assert_eq!(*kind(g, pat.root()), NodeKind::Start);
    Ok(())
}

#[test]
fn star_chain() -> Result<()> {
    let pat = compile("ab*c", false)?;
    let g = pat.graph();
    let a = pat.match_root();
    assert_eq!(*kind(g, a), NodeKind::Slice(cps("a")));
    let b = next(g, a);
    let NodeKind::GreedyCharRun { ref predicate, min } = *kind(g, b) else {
        panic!("expected a character run, got {:?}", kind(g, b))
    };
    assert_eq!(min, 0);
    assert!(predicate.test(u32::from('b')));
    assert!(!predicate.test(u32::from('c')));
    let c = next(g, b);
    assert_eq!(*kind(g, c), NodeKind::Slice(cps("c")));
    assert_eq!(next(g, c), NodeId::LAST_ACCEPT);
    Ok(())
}

#[test]
fn alternation_in_a_loop() -> Result<()> {
    let pat = compile("(ab|cd)+", false)?;
    let g = pat.graph();
    let prolog = pat.match_root();
    let NodeKind::Prolog { looped } = *kind(g, prolog) else {
        panic!("expected a prolog, got {:?}", kind(g, prolog))
    };
    assert_eq!(next(g, prolog), looped);
    let NodeKind::Loop { body, min, max } = *kind(g, looped) else {
        panic!("expected a loop, got {:?}", kind(g, looped))
    };
    assert_eq!((min, max), (1, None));
    assert_eq!(next(g, looped), NodeId::LAST_ACCEPT);

    let NodeKind::GroupStart { end } = *kind(g, body) else {
        panic!("expected a group, got {:?}", kind(g, body))
    };
    assert_eq!(next(g, end), looped);
    let branch = next(g, body);
    let NodeKind::Branch { ref alternatives, join } = *kind(g, branch) else {
        panic!("expected a branch, got {:?}", kind(g, branch))
    };
    let slices: Vec<&NodeKind> =
        alternatives.iter().map(|alt| kind(g, alt.unwrap())).collect();
    assert_eq!(
        slices,
        vec![&NodeKind::Slice(cps("ab")), &NodeKind::Slice(cps("cd"))]
    );
    for alt in alternatives {
        assert_eq!(next(g, alt.unwrap()), join);
    }
    assert_eq!(next(g, join), end);
    Ok(())
}

#[test]
fn single_alternative_is_not_wrapped() -> Result<()> {
    let pat = compile("(abc)", false)?;
    let g = pat.graph();
    let group = pat.match_root();
    assert!(matches!(kind(g, group), NodeKind::GroupStart { .. }));
    assert_eq!(*kind(g, next(g, group)), NodeKind::Slice(cps("abc")));
    assert!(!g
        .iter()
        .any(|(_, node)| matches!(node.kind(), NodeKind::Branch { .. })));
    Ok(())
}

#[test]
fn lazy_and_possessive_groups() -> Result<()> {
    let pat = compile("(ab){2,4}?", false)?;
    let g = pat.graph();
    let NodeKind::Prolog { looped } = *kind(g, pat.match_root()) else {
        panic!("expected a prolog")
    };
    assert!(matches!(
        kind(g, looped),
        NodeKind::LazyLoop { min: 2, max: Some(4), .. }
    ));

    let pat = compile("(ab){2,4}+", false)?;
    let g = pat.graph();
    assert!(matches!(
        kind(g, pat.match_root()),
        NodeKind::Bounded {
            min: 2,
            max: Some(4),
            quantifier: Quantifier::Possessive,
            ..
        }
    ));
    Ok(())
}

#[test]
fn counted_repetition_is_bounded() {
    fn prop(a: u16, b: u16) -> bool {
        let (m, n) = (u32::from(a.min(b)), u32::from(a.max(b)));
        let pat = compile(&format!("a{{{},{}}}", m, n), false).unwrap();
        match *pat.node(pat.match_root()).kind() {
            NodeKind::Optional { .. } => (m, n) == (0, 1),
            NodeKind::Bounded { min, max, quantifier, .. } => {
                min == m && max == Some(n) && quantifier == Quantifier::Greedy
            }
            _ => false,
        }
    }
    QuickCheck::new()
        .tests(1_000)
        .quickcheck(prop as fn(u16, u16) -> bool);
}

#[test]
fn counted_repetition_of_nothing() -> Result<()> {
    let pat = compile("a{2}{3}", false)?;
    let g = pat.graph();
    let first = pat.match_root();
    let NodeKind::Bounded { min: 2, max: Some(2), .. } = *kind(g, first)
    else {
        panic!("expected a{{2}}, got {:?}", pat)
    };
    let second = next(g, first);
    let NodeKind::Bounded { atom, min: 3, max: Some(3), .. } =
        *kind(g, second)
    else {
        panic!("expected {{3}}, got {:?}", pat)
    };
    assert_eq!(*kind(g, atom), NodeKind::Slice(vec![]));
    assert_eq!(next(g, second), NodeId::LAST_ACCEPT);
    Ok(())
}

#[test]
fn escaped_surrogate_pairs_combine() -> Result<()> {
    let pat = compile(r"\uD83D\uDCA9", false)?;
    let g = pat.graph();
    assert_eq!(*kind(g, pat.match_root()), NodeKind::Slice(vec![0x1F4A9]));

    let pat = compile(r"\uD83D\u0041", false)?;
    let g = pat.graph();
    let run = vec![0xD83D, 0x41];
    assert_eq!(*kind(g, pat.match_root()), NodeKind::Slice(run));
    Ok(())
}

#[test]
fn reversed_counted_repetition_fails() {
    fn prop(a: u16, b: u16) -> TestResult {
        if a == b {
            return TestResult::discard();
        }
        let (m, n) = (a.max(b), a.min(b));
        let err = compile(&format!("a{{{},{}}}", m, n), false).unwrap_err();
        TestResult::from_bool(
            *err.kind() == ErrorKind::IllegalRepetitionRange,
        )
    }
    QuickCheck::new()
        .tests(1_000)
        .quickcheck(prop as fn(u16, u16) -> TestResult);
}

#[test]
fn escapes_build_their_own_nodes() -> Result<()> {
    for letter in ['d', 'D', 's', 'S', 'w', 'W', 'b', 'B', 'A', 'Z', 'G'] {
        let pattern = format!("\\{}", letter);
        let pat = compile(&pattern, false)?;
        let node = pat.node(pat.match_root());
        assert!(
            !matches!(node.kind(), NodeKind::Slice(_)),
            "{}: {:?}",
            pattern,
            node
        );
        assert_eq!(node.next(), Some(NodeId::LAST_ACCEPT), "{}", pattern);
    }
    Ok(())
}

#[test]
fn anchors() -> Result<()> {
    let pat = compile("^a$", false)?;
    let g = pat.graph();
    assert_eq!(pat.root(), pat.match_root());
    assert_eq!(*kind(g, pat.root()), NodeKind::Begin);
    let a = next(g, pat.root());
    assert_eq!(*kind(g, next(g, a)), NodeKind::Dollar);
    Ok(())
}

#[test]
fn empty_pattern() -> Result<()> {
    let pat = compile("", false)?;
    assert_eq!(pat.match_root(), NodeId::LAST_ACCEPT);
    assert_eq!(*pat.node(pat.root()).kind(), NodeKind::Start);
    assert_eq!(pat.node(pat.root()).next(), Some(NodeId::LAST_ACCEPT));
    Ok(())
}
