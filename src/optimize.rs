use crate::graph::{BoyerMoore, Graph, NodeId, NodeKind};

/// The shortest literal run worth building Boyer-Moore tables for.
const MIN_BOYER_MOORE_LEN: usize = 4;

/// Pick the scanning root for a compiled match graph.
///
/// A match graph that starts with a long enough case sensitive literal run
/// is scanned with Boyer-Moore, and one that starts with `Begin` can only
/// match at the start anyway. Everything else is wrapped in `Start`.
pub(crate) fn root(graph: &mut Graph, match_root: NodeId) -> NodeId {
    let node = graph.node(match_root);
    let next = node.next().unwrap_or(NodeId::ACCEPT);
    match *node.kind() {
        NodeKind::Slice(ref run) if run.len() >= MIN_BOYER_MOORE_LEN => {
            let table = BoyerMoore::new(run.clone());
            debug!(
                "using Boyer-Moore for a literal prefix of length {}",
                table.codepoints.len()
            );
            let root = graph.add(NodeKind::BoyerMoore(Box::new(table)));
            graph.set_next(root, next);
            root
        }
        NodeKind::Begin => {
            debug!("pattern is anchored, scanning from the match root");
            match_root
        }
        _ => {
            debug!("scanning with Start");
            let root = graph.add(NodeKind::Start);
            graph.set_next(root, match_root);
            root
        }
    }
}

impl BoyerMoore {
    /// Build the bad character and good suffix tables for a literal run.
    ///
    /// The bad character table only looks at the low seven bits of each code
    /// point, so code points that share them also share an entry.
    pub(crate) fn new(codepoints: Vec<u32>) -> BoyerMoore {
        let len = codepoints.len();
        let mut last_occurrence = [0u32; 128];
        for (i, &cp) in codepoints.iter().enumerate() {
            last_occurrence[(cp & 0x7F) as usize] = shift(i + 1);
        }

        let mut good_suffix = vec![0u32; len];
        'shifts: for i in (1..=len).rev() {
            // Does the suffix starting at `i` also occur `i` positions
            // earlier? Every position it covers can shift by `i`.
            let mut j = len - 1;
            while j >= i {
                if codepoints[j] != codepoints[j - i] {
                    continue 'shifts;
                }
                good_suffix[j - 1] = shift(i);
                j -= 1;
            }
            while j > 0 {
                j -= 1;
                good_suffix[j] = shift(i);
            }
        }
        if let Some(last) = good_suffix.last_mut() {
            *last = 1;
        }
        BoyerMoore { codepoints, last_occurrence, good_suffix }
    }
}

/// Convert a position within a literal run to a table entry.
fn shift(n: usize) -> u32 {
    // A run never has more code points than the pattern it came from, whose
    // length in code points fits in a u32 for any pattern we can parse.
    u32::try_from(n).unwrap_or(u32::MAX)
}
