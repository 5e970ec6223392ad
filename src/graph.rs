/*!
The compiled representation of a pattern: a graph of matching nodes.

Nodes live in an arena (a [`Graph`]) and refer to each other by [`NodeId`].
Every node has exactly one `next` edge, and matching falls through the chain
of `next` edges. Nodes that repeat or choose between sub-graphs (quantifiers,
loops and branches) additionally point at the head of each sub-graph.

The arena always starts with two shared terminal nodes. [`NodeId::ACCEPT`] is
the global success node and the only node without a successor.
[`NodeId::LAST_ACCEPT`] marks the end of the pattern itself and continues to
`ACCEPT`.

Sub-graphs owned by a quantifier (the `atom` of [`NodeKind::Optional`] and
[`NodeKind::Bounded`]) end at `ACCEPT`. The body of a [`NodeKind::Loop`] ends
at the loop node itself, which is the only cycle a compiled graph may have.
[`Graph::check`] verifies both rules.
*/

use core::fmt;

use crate::predicate::CharPredicate;

/// The identifier of a node in a [`Graph`].
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    /// The global success node.
    pub const ACCEPT: NodeId = NodeId(0);
    /// The node every compiled pattern ends with.
    pub const LAST_ACCEPT: NodeId = NodeId(1);

    /// Return this identifier as an index into the arena.
    pub fn as_usize(self) -> usize {
        // OK because we never build on a target with 16-bit pointers.
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// How a repetition prefers to match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantifier {
    /// As many times as possible, giving back on backtracking.
    Greedy,
    /// As few times as possible, taking more on backtracking.
    Lazy,
    /// As many times as possible, never giving back.
    Possessive,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Quantifier::Greedy => "GREEDY",
            Quantifier::Lazy => "LAZY",
            Quantifier::Possessive => "POSSESSIVE",
        };
        f.write_str(name)
    }
}

/// The flavor of a word boundary assertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Boundary {
    /// `\b`: a word character on exactly one side.
    Both,
    /// `\B`: word characters on both sides or neither.
    None,
}

/// A literal run prepared for Boyer-Moore search.
#[derive(Clone, Eq, PartialEq)]
pub struct BoyerMoore {
    /// The literal run.
    pub codepoints: Vec<u32>,
    /// For each value of the low seven bits of a code point, one past the
    /// last position where that value occurs in the run (zero if it doesn't).
    pub last_occurrence: [u32; 128],
    /// For each position of the run, how far the run may shift when the
    /// suffix after that position matched.
    pub good_suffix: Vec<u32>,
}

impl fmt::Debug for BoyerMoore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoyerMoore")
            .field("codepoints", &self.codepoints)
            .field("good_suffix", &self.good_suffix)
            .finish()
    }
}

/// The kind of a node, with whatever data that kind needs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    /// Global success.
    Accept,
    /// The end of the pattern.
    LastAccept,
    /// Try the rest of the graph at every position of the input.
    Start,
    /// `\A` or `^`: the beginning of the input.
    Begin,
    /// `\z`: the very end of the input.
    End,
    /// `$` or `\Z`: the end of the input, or before a final line terminator.
    Dollar,
    /// `\G`: where the previous match ended.
    LastMatchEnd,
    /// `\R`: any line ending, with `\r\n` matched as one.
    LineEnding,
    /// `\b` or `\B`.
    WordBoundary(Boundary),
    /// A single code point satisfying a predicate.
    Char(CharPredicate),
    /// Like `Char`, for a predicate that can only match in the BMP.
    BmpChar(CharPredicate),
    /// A literal run matched case sensitively.
    Slice(Vec<u32>),
    /// A literal run matched case insensitively. The code points are folded.
    SliceFolded(Vec<u32>),
    /// A literal run searched for with Boyer-Moore.
    BoyerMoore(Box<BoyerMoore>),
    /// Match `atom` zero or one times.
    Optional { atom: NodeId, quantifier: Quantifier },
    /// Match `atom` at least `min` and at most `max` times. No `max` means
    /// unbounded.
    Bounded {
        atom: NodeId,
        min: u32,
        max: Option<u32>,
        quantifier: Quantifier,
    },
    /// Match a predicate at least `min` times, greedily and without bound.
    GreedyCharRun { predicate: CharPredicate, min: u32 },
    /// Sets up the iteration state of `looped`, which must be a `Loop` or
    /// `LazyLoop` node, and enters it.
    Prolog { looped: NodeId },
    /// Run `body` greedily between `min` and `max` times. The body ends at
    /// this node.
    Loop { body: NodeId, min: u32, max: Option<u32> },
    /// Run `body` lazily between `min` and `max` times. The body ends at this
    /// node.
    LazyLoop { body: NodeId, min: u32, max: Option<u32> },
    /// Try each alternative in order. `None` is an empty alternative that
    /// goes straight to `join`. Every other alternative ends at `join`.
    Branch { alternatives: Vec<Option<NodeId>>, join: NodeId },
    /// The node every alternative of a branch meets at.
    BranchJoin,
    /// Records where a parenthesized group starts. `end` is the matching
    /// `GroupEnd`.
    GroupStart { end: NodeId },
    /// Records where a parenthesized group ends.
    GroupEnd,
}

impl NodeKind {
    /// A short name for this kind of node.
    pub fn name(&self) -> &'static str {
        match *self {
            NodeKind::Accept => "Accept",
            NodeKind::LastAccept => "LastAccept",
            NodeKind::Start => "Start",
            NodeKind::Begin => "Begin",
            NodeKind::End => "End",
            NodeKind::Dollar => "Dollar",
            NodeKind::LastMatchEnd => "LastMatchEnd",
            NodeKind::LineEnding => "LineEnding",
            NodeKind::WordBoundary(_) => "WordBoundary",
            NodeKind::Char(_) => "Char",
            NodeKind::BmpChar(_) => "BmpChar",
            NodeKind::Slice(_) => "Slice",
            NodeKind::SliceFolded(_) => "SliceFolded",
            NodeKind::BoyerMoore(_) => "BoyerMoore",
            NodeKind::Optional { .. } => "Optional",
            NodeKind::Bounded { .. } => "Bounded",
            NodeKind::GreedyCharRun { .. } => "GreedyCharRun",
            NodeKind::Prolog { .. } => "Prolog",
            NodeKind::Loop { .. } => "Loop",
            NodeKind::LazyLoop { .. } => "LazyLoop",
            NodeKind::Branch { .. } => "Branch",
            NodeKind::BranchJoin => "BranchJoin",
            NodeKind::GroupStart { .. } => "GroupStart",
            NodeKind::GroupEnd => "GroupEnd",
        }
    }

    /// Returns true for the kinds that match exactly one code point.
    pub fn is_char(&self) -> bool {
        matches!(*self, NodeKind::Char(_) | NodeKind::BmpChar(_))
    }

    /// Returns true for a `Loop` or `LazyLoop`.
    pub fn is_loop(&self) -> bool {
        matches!(*self, NodeKind::Loop { .. } | NodeKind::LazyLoop { .. })
    }
}

/// A node: its kind and its successor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    kind: NodeKind,
    next: Option<NodeId>,
}

impl Node {
    /// The kind of this node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node matching continues with. Only `Accept` has none.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }
}

/// An arena of nodes.
#[derive(Clone, Eq, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Create an arena holding only the two terminal nodes.
    pub(crate) fn new() -> Graph {
        let accept = Node { kind: NodeKind::Accept, next: None };
        let last =
            Node { kind: NodeKind::LastAccept, next: Some(NodeId::ACCEPT) };
        Graph { nodes: vec![accept, last] }
    }

    /// Returns the node with the given identifier.
    ///
    /// # Panics
    ///
    /// If the identifier comes from a different graph and is out of bounds.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.as_usize()]
    }

    /// Returns the total number of nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds nothing but the terminal nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    /// Iterate over every node along with its identifier.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (id_from_index(i), n))
    }

    /// Add a node whose successor is `ACCEPT`.
    pub(crate) fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = id_from_index(self.nodes.len());
        self.nodes.push(Node { kind, next: Some(NodeId::ACCEPT) });
        id
    }

    /// Point the successor edge of `id` at `next`.
    pub(crate) fn set_next(&mut self, id: NodeId, next: NodeId) {
        self.nodes[id.as_usize()].next = Some(next);
    }

    /// Replace the kind of `id` in place, keeping its successor.
    pub(crate) fn replace(&mut self, id: NodeId, kind: NodeKind) -> NodeKind {
        core::mem::replace(&mut self.nodes[id.as_usize()].kind, kind)
    }

    /// Return a mutable borrow of the kind of `id`.
    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.as_usize()].kind
    }

    /// Returns the edges leaving a node: its successor first, then any
    /// sub-graph heads, in matching order.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        let mut out: Vec<NodeId> = node.next.into_iter().collect();
        match node.kind {
            NodeKind::Optional { atom, .. }
            | NodeKind::Bounded { atom, .. } => out.push(atom),
            NodeKind::Prolog { looped } => out.push(looped),
            NodeKind::Loop { body, .. }
            | NodeKind::LazyLoop { body, .. } => out.push(body),
            NodeKind::Branch { ref alternatives, join } => {
                out.extend(alternatives.iter().flatten().copied());
                out.push(join);
            }
            _ => {}
        }
        out
    }

    /// Verify the structural invariants of the graph reachable from `root`:
    /// every path ends at `ACCEPT`, and the only edges that close a cycle are
    /// successor edges into a `Loop` or `LazyLoop` node from inside its body.
    pub fn check(&self, root: NodeId) -> Result<(), GraphError> {
        #[derive(Clone, Copy, Eq, PartialEq)]
        enum Mark {
            Unseen,
            Active,
            Done,
        }

        if root.as_usize() >= self.nodes.len() {
            return Err(GraphError::new(root, "root is out of bounds"));
        }
        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        // An explicit stack, since chains can be as long as the pattern.
        let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = vec![];
        marks[root.as_usize()] = Mark::Active;
        stack.push((root, self.successors(root), 0));
        while let Some(&mut (id, ref succs, ref mut i)) = stack.last_mut() {
            let Some(&to) = succs.get(*i) else {
                if self.node(id).next.is_none()
                    && self.node(id).kind != NodeKind::Accept
                {
                    return Err(GraphError::new(id, "dead end"));
                }
                marks[id.as_usize()] = Mark::Done;
                stack.pop();
                continue;
            };
            *i += 1;
            let is_next_edge = *i == 1 && self.node(id).next == Some(to);
            if to.as_usize() >= self.nodes.len() {
                return Err(GraphError::new(id, "edge out of bounds"));
            }
            match marks[to.as_usize()] {
                Mark::Done => {}
                Mark::Active => {
                    if !(is_next_edge && self.node(to).kind.is_loop()) {
                        return Err(GraphError::new(id, "illegal cycle"));
                    }
                }
                Mark::Unseen => {
                    marks[to.as_usize()] = Mark::Active;
                    stack.push((to, self.successors(to), 0));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph(")?;
        for (id, node) in self.iter() {
            write!(f, "{:06?}: {:?}", id, node.kind)?;
            match node.next {
                Some(next) => writeln!(f, " => {:?}", next)?,
                None => writeln!(f)?,
            }
        }
        writeln!(f, ")")
    }
}

/// A violation of the structural invariants of a graph, found by
/// [`Graph::check`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GraphError {
    node: NodeId,
    reason: &'static str,
}

impl GraphError {
    fn new(node: NodeId, reason: &'static str) -> GraphError {
        GraphError { node, reason }
    }

    /// The node at which the violation was found.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl std::error::Error for GraphError {}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid graph at node {:?}: {}", self.node, self.reason)
    }
}

fn id_from_index(index: usize) -> NodeId {
    // A pattern produces a bounded number of nodes per code point, so running
    // out of 32-bit identifiers would take a pattern of several gigabytes.
    NodeId(u32::try_from(index).expect("node count exceeds u32::MAX"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(g: &mut Graph, s: &str) -> NodeId {
        g.add(NodeKind::Slice(s.chars().map(u32::from).collect()))
    }

    #[test]
    fn terminals() {
        let g = Graph::new();
        assert_eq!(g.len(), 2);
        assert!(g.is_empty());
        assert_eq!(g.node(NodeId::ACCEPT).next(), None);
        assert_eq!(g.node(NodeId::LAST_ACCEPT).next(), Some(NodeId::ACCEPT));
        assert!(g.check(NodeId::LAST_ACCEPT).is_ok());
    }

    #[test]
    fn chain_is_valid() {
        let mut g = Graph::new();
        let a = literal(&mut g, "ab");
        let b = literal(&mut g, "cd");
        g.set_next(a, b);
        g.set_next(b, NodeId::LAST_ACCEPT);
        assert!(g.check(a).is_ok());
    }

    #[test]
    fn loop_cycle_is_valid() {
        let mut g = Graph::new();
        let body = literal(&mut g, "ab");
        let looped = g.add(NodeKind::Loop { body, min: 1, max: None });
        let prolog = g.add(NodeKind::Prolog { looped });
        g.set_next(body, looped);
        g.set_next(prolog, looped);
        g.set_next(looped, NodeId::LAST_ACCEPT);
        assert_eq!(g.check(prolog), Ok(()));
    }

    #[test]
    fn other_cycles_are_rejected() {
        let mut g = Graph::new();
        let a = literal(&mut g, "a");
        let b = literal(&mut g, "b");
        g.set_next(a, b);
        g.set_next(b, a);
        let err = g.check(a).unwrap_err();
        assert_eq!(err.node(), b);
    }

    #[test]
    fn branch_edges() {
        let mut g = Graph::new();
        let join = g.add(NodeKind::BranchJoin);
        let a = literal(&mut g, "a");
        g.set_next(a, join);
        g.set_next(join, NodeId::LAST_ACCEPT);
        let branch = g.add(NodeKind::Branch {
            alternatives: vec![Some(a), None],
            join,
        });
        assert_eq!(g.successors(branch), vec![NodeId::ACCEPT, a, join]);
        assert!(g.check(branch).is_ok());
    }

    #[test]
    fn replace_keeps_next() {
        let mut g = Graph::new();
        let a = literal(&mut g, "a");
        g.set_next(a, NodeId::LAST_ACCEPT);
        let old = g.replace(a, NodeKind::End);
        assert_eq!(old.name(), "Slice");
        assert_eq!(g.node(a).kind(), &NodeKind::End);
        assert_eq!(g.node(a).next(), Some(NodeId::LAST_ACCEPT));
    }
}
