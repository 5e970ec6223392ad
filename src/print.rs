/*!
This module provides a printer that renders a compiled graph as an indented
tree, one node per line.
*/

use core::fmt;

use crate::graph::{Boundary, Graph, NodeId, NodeKind};

/// A printer for compiled pattern graphs.
///
/// Each printed node is prefixed by its identifier. The sub-graphs that a
/// node runs on the side (the atom of a quantifier, the body of a loop or a
/// group, the alternatives of a branch) are indented one level deeper and
/// closed by a `/Name` line. When a node's successor was already printed, the
/// line ends with `(=>id)`, which is how the back edge into a loop shows up.
///
/// # Example
///
/// ```
/// use regex_graph::{Pattern, Printer};
///
/// let pat = Pattern::new("ab*c").unwrap();
/// let mut out = String::new();
/// Printer::new().print(pat.graph(), pat.root(), &mut out).unwrap();
/// assert_eq!(
///     out.lines().collect::<Vec<_>>(),
///     vec![
///         "     5:  <Start>",
///         "     2:  <Slice \"a\">",
///         "     3:  <GreedyCharRun 'b'*>",
///         "     4:  <Slice \"c\">",
///         "     1:  <END>",
///     ],
/// );
/// ```
#[derive(Debug, Default)]
pub struct Printer {
    _priv: (),
}

impl Printer {
    /// Create a new printer.
    pub fn new() -> Printer {
        Printer { _priv: () }
    }

    /// Print the graph reachable from `root` to the given writer.
    pub fn print<W: fmt::Write>(
        &mut self,
        graph: &Graph,
        root: NodeId,
        wtr: W,
    ) -> fmt::Result {
        let mut writer =
            Writer { graph, wtr, printed: vec![false; graph.len()] };
        writer.walk(Some(root), 0)
    }
}

struct Writer<'g, W> {
    graph: &'g Graph,
    wtr: W,
    printed: Vec<bool>,
}

impl<'g, W: fmt::Write> Writer<'g, W> {
    /// Print the chain starting at `node`, stopping at whatever ends the
    /// enclosing sub-graph.
    fn walk(&mut self, mut node: Option<NodeId>, depth: usize) -> fmt::Result {
        let graph = self.graph;
        let depth = depth + 1;
        while let Some(id) = node {
            let kind = graph.node(id).kind();
            match *kind {
                NodeKind::Accept
                | NodeKind::Loop { .. }
                | NodeKind::LazyLoop { .. }
                | NodeKind::GroupEnd
                | NodeKind::BranchJoin => return Ok(()),
                NodeKind::Prolog { looped } => {
                    self.node(id, kind.name(), depth)?;
                    let looped_kind = graph.node(looped).kind();
                    let (body, min, max) = match *looped_kind {
                        NodeKind::Loop { body, min, max }
                        | NodeKind::LazyLoop { body, min, max } => {
                            (body, min, max)
                        }
                        _ => return Err(fmt::Error),
                    };
                    let name = looped_kind.name();
                    let text = format!("{} {}", name, Range(min, max));
                    self.node(looped, &text, depth)?;
                    self.walk(Some(body), depth)?;
                    self.close(name, depth)?;
                    node = Some(looped);
                }
                NodeKind::Bounded { atom, min, max, quantifier } => {
                    let text = format!(
                        "{} {} {}",
                        kind.name(),
                        quantifier,
                        Range(min, max)
                    );
                    self.node(id, &text, depth)?;
                    self.walk(Some(atom), depth)?;
                    self.close(kind.name(), depth)?;
                }
                NodeKind::Optional { atom, quantifier } => {
                    let text = format!("{} {}", kind.name(), quantifier);
                    self.node(id, &text, depth)?;
                    self.walk(Some(atom), depth)?;
                    self.close(kind.name(), depth)?;
                }
                NodeKind::GroupStart { end } => {
                    self.node(id, kind.name(), depth)?;
                    self.walk(graph.node(id).next(), depth)?;
                    self.node(end, "/GroupEnd", depth)?;
                    node = Some(end);
                }
                NodeKind::Branch { ref alternatives, join } => {
                    self.node(id, kind.name(), depth)?;
                    for (i, &alt) in alternatives.iter().enumerate() {
                        if i > 0 {
                            self.line("-branch.separator-", depth)?;
                        }
                        match alt {
                            Some(alt) => self.walk(Some(alt), depth)?,
                            None => self.line("  (accepted)", depth)?,
                        }
                    }
                    self.node(join, "/Branch", depth)?;
                    node = Some(join);
                }
                NodeKind::Char(ref p) | NodeKind::BmpChar(ref p) => {
                    self.node(id, &format!("{} {}", kind.name(), p), depth)?;
                }
                NodeKind::Slice(ref cps) | NodeKind::SliceFolded(ref cps) => {
                    let text = format!("{} {:?}", kind.name(), Run(cps));
                    self.node(id, &text, depth)?;
                }
                NodeKind::BoyerMoore(ref bm) => {
                    let text =
                        format!("{} {:?}", kind.name(), Run(&bm.codepoints));
                    self.node(id, &text, depth)?;
                }
                NodeKind::GreedyCharRun { ref predicate, min } => {
                    let text = format!(
                        "{} {}{}",
                        kind.name(),
                        predicate,
                        RunCount(min)
                    );
                    self.node(id, &text, depth)?;
                }
                NodeKind::WordBoundary(Boundary::None) => {
                    self.node(id, "WordBoundary NONE", depth)?;
                }
                NodeKind::LastAccept => self.node(id, "END", depth)?,
                _ => self.node(id, kind.name(), depth)?,
            }
            node = node.and_then(|id| graph.node(id).next());
        }
        Ok(())
    }

    /// Print a line for a node and remember that it was printed.
    fn node(&mut self, id: NodeId, text: &str, depth: usize) -> fmt::Result {
        self.printed[id.as_usize()] = true;
        write!(
            self.wtr,
            "{:6}:{:indent$}<{}>",
            id.as_usize(),
            "",
            text,
            indent = depth * 2
        )?;
        if let Some(next) = self.graph.node(id).next() {
            if self.printed[next.as_usize()] {
                write!(self.wtr, " (=>{})", next.as_usize())?;
            }
        }
        self.wtr.write_str("\n")
    }

    /// Print a line that doesn't belong to any node.
    fn line(&mut self, text: &str, depth: usize) -> fmt::Result {
        writeln!(
            self.wtr,
            "       {:indent$}<{}>",
            "",
            text,
            indent = depth * 2
        )
    }

    fn close(&mut self, name: &str, depth: usize) -> fmt::Result {
        self.line(&format!("/{}", name), depth)
    }
}

/// Displays repetition bounds the way they are commonly written.
struct Range(u32, Option<u32>);

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Range(0, None) => write!(f, " * "),
            Range(1, None) => write!(f, " + "),
            Range(min, None) => write!(f, "{{{}, max}}", min),
            Range(min, Some(max)) => write!(f, "{{{}, {}}}", min, max),
        }
    }
}

/// Displays the minimum of a character run as a suffix operator.
struct RunCount(u32);

impl fmt::Display for RunCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "*"),
            1 => write!(f, "+"),
            min => write!(f, "{{{},}}", min),
        }
    }
}

/// Displays a literal run as a quoted string. Code points that aren't
/// printable ASCII are written as `\u{..}` escapes.
struct Run<'a>(&'a [u32]);

impl<'a> fmt::Debug for Run<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for &cp in self.0 {
            match char::from_u32(cp) {
                Some(c) if c == ' ' || c.is_ascii_graphic() => {
                    write!(f, "{}", c)?
                }
                _ => write!(f, "\\u{{{:X}}}", cp)?,
            }
        }
        f.write_str("\"")
    }
}
