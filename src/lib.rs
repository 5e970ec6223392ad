/*!
This crate compiles regular expression patterns into a graph of matcher
nodes, ready to be walked by a backtracking engine.

The compiler covers a large Perl-like syntax: literals and escapes, character
classes with nesting, intersection and negation, Unicode categories, scripts,
blocks and binary properties, anchors and word boundaries, greedy, lazy and
possessive quantifiers, groups and alternation. It does not match anything
itself. The result of a compilation is a [`Pattern`], which owns an arena of
[`Node`]s and knows two entry points into it:

* [`Pattern::match_root`] starts an anchored match. Every path from it ends at
  the `LastAccept` node, whose successor is the global `Accept` node.
* [`Pattern::root`] starts an unanchored scan. It is usually a `Start` node
  wrapping the match root, or a Boyer-Moore node when the pattern begins with
  a long enough literal.

# Example

```
use regex_graph::{compile, NodeKind};

let pat = compile("ab*c", false).unwrap();
let graph = pat.graph();

let a = pat.match_root();
assert_eq!(graph.node(a).kind(), &NodeKind::Slice(vec![0x61]));
let b = graph.node(a).next().unwrap();
assert_eq!(graph.node(b).kind().name(), "GreedyCharRun");
```

# Errors

Compilation either produces a complete graph or fails with an [`Error`],
which reports what went wrong and where:

```
use regex_graph::{compile, ErrorKind};

let err = compile("(a", false).unwrap_err();
assert_eq!(err.kind(), &ErrorKind::UnclosedGroup);
assert_eq!(err.offset(), 2);
```

# Crate features

* **logging** - Emit compile steps through the [`log`](https://docs.rs/log)
  crate. Compilation start and end, the choice of scanning root and failures
  are logged at `debug` level, individual parse steps at `trace` level.
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

pub use crate::{
    error::{Error, ErrorKind},
    graph::{
        Boundary, BoyerMoore, Graph, GraphError, Node, NodeId, NodeKind,
        Quantifier,
    },
    pattern::{Config, Pattern, PatternBuilder},
    predicate::{AsciiClass, CharPredicate, PredicateKind},
    print::Printer,
    unicode::{Block, Property},
};

#[macro_use]
mod macros;

mod buffer;
mod error;
mod graph;
mod optimize;
mod parse;
mod pattern;
mod predicate;
mod print;
mod unicode;

/// Compile a pattern, optionally case insensitively.
///
/// This is a shorthand for
/// `PatternBuilder::new(pattern).case_insensitive(case_insensitive).build()`.
///
/// # Example
///
/// ```
/// let pat = regex_graph::compile("hello", true).unwrap();
/// assert_eq!(pat.as_str(), "hello");
/// assert!(pat.is_case_insensitive());
/// ```
pub fn compile(
    pattern: &str,
    case_insensitive: bool,
) -> Result<Pattern, Error> {
    PatternBuilder::new(pattern).case_insensitive(case_insensitive).build()
}
