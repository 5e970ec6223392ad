use {
    anyhow::Result,
    regex_graph::{compile, Graph, NodeId, NodeKind, Pattern},
};

use crate::CORPUS;

fn compile_all(case_insensitive: bool) -> Result<Vec<Pattern>> {
    let mut pats = vec![];
    for pattern in CORPUS {
        pats.push(compile(pattern, case_insensitive)?);
    }
    Ok(pats)
}

/// Collects every node reachable from `root`, following both successor
/// edges and sub-graph edges.
fn reachable(graph: &Graph, root: NodeId) -> Vec<NodeId> {
    let mut seen = vec![false; graph.len()];
    let mut stack = vec![root];
    let mut out = vec![];
    while let Some(id) = stack.pop() {
        if seen[id.as_usize()] {
            continue;
        }
        seen[id.as_usize()] = true;
        out.push(id);
        stack.extend(graph.successors(id));
    }
    out
}

#[test]
fn graphs_are_well_formed() -> Result<()> {
    for case_insensitive in [false, true] {
        for pat in compile_all(case_insensitive)? {
            let g = pat.graph();
            g.check(pat.root())
                .map_err(|e| anyhow::anyhow!("{:?}: {}", pat.as_str(), e))?;
            g.check(pat.match_root())
                .map_err(|e| anyhow::anyhow!("{:?}: {}", pat.as_str(), e))?;
        }
    }
    Ok(())
}

#[test]
fn terminals_are_fixed() -> Result<()> {
    for pat in compile_all(false)? {
        let g = pat.graph();
        assert_eq!(*g.node(NodeId::ACCEPT).kind(), NodeKind::Accept);
        assert_eq!(g.node(NodeId::ACCEPT).next(), None);
        assert_eq!(*g.node(NodeId::LAST_ACCEPT).kind(), NodeKind::LastAccept);
        assert_eq!(g.node(NodeId::LAST_ACCEPT).next(), Some(NodeId::ACCEPT));
    }
    Ok(())
}

#[test]
fn every_match_reaches_last_accept() -> Result<()> {
    for pat in compile_all(false)? {
        let nodes = reachable(pat.graph(), pat.match_root());
        assert!(
            nodes.contains(&NodeId::LAST_ACCEPT),
            "{:?} never reaches LastAccept",
            pat.as_str()
        );
    }
    Ok(())
}

#[test]
fn loops_and_groups_pair_up() -> Result<()> {
    for pat in compile_all(false)? {
        let g = pat.graph();
        for id in reachable(g, pat.root()) {
            match *g.node(id).kind() {
                NodeKind::Prolog { looped } => {
                    assert!(g.node(looped).kind().is_loop(), "{}", pat);
                    assert_eq!(g.node(id).next(), Some(looped), "{}", pat);
                }
                NodeKind::GroupStart { end } => {
                    assert_eq!(*g.node(end).kind(), NodeKind::GroupEnd);
                }
                NodeKind::Branch { ref alternatives, join } => {
                    assert!(alternatives.len() >= 2, "{}", pat);
                    assert_eq!(*g.node(join).kind(), NodeKind::BranchJoin);
                }
                NodeKind::Bounded { min, max: Some(max), .. } => {
                    assert!(min <= max, "{}", pat);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[test]
fn character_nodes_respect_bmp_tags() -> Result<()> {
    for case_insensitive in [false, true] {
        for pat in compile_all(case_insensitive)? {
            for (_, node) in pat.graph().iter() {
                match *node.kind() {
                    NodeKind::BmpChar(ref p) => assert!(p.is_bmp()),
                    NodeKind::Char(ref p) => assert!(!p.is_bmp()),
                    ref kind => assert!(!kind.is_char()),
                }
            }
        }
    }
    Ok(())
}

#[test]
fn compilation_is_deterministic() -> Result<()> {
    for pattern in CORPUS {
        let (a, b) = (compile(pattern, false)?, compile(pattern, false)?);
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }
    Ok(())
}
