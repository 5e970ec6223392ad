use core::fmt;

use crate::{
    error::Error,
    graph::{Graph, Node, NodeId},
    optimize,
    parse::Parser,
};

/// The default maximum nesting depth of groups and classes.
const DEFAULT_NEST_LIMIT: u32 = 250;

/// The configuration of a single compilation.
///
/// A `Config` is cheap to copy. Its setters consume and return it, so that
/// settings can be chained:
///
/// ```
/// use regex_graph::Config;
///
/// let config = Config::new().case_insensitive(true).nest_limit(10);
/// assert!(config.get_case_insensitive());
/// assert_eq!(config.get_nest_limit(), 10);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) case_insensitive: bool,
    pub(crate) nest_limit: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config { case_insensitive: false, nest_limit: DEFAULT_NEST_LIMIT }
    }
}

impl Config {
    /// Return a new default configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Whether literals, classes and families match case insensitively.
    /// Case folding uses the simple Unicode case mappings.
    ///
    /// The default for this is `false`.
    pub fn case_insensitive(self, yes: bool) -> Config {
        Config { case_insensitive: yes, ..self }
    }

    /// Set the maximum nesting depth of groups and character classes.
    ///
    /// Compiling a pattern that nests deeper than this fails with
    /// [`ErrorKind::NestLimitExceeded`](crate::ErrorKind::NestLimitExceeded)
    /// instead of exhausting the stack. A limit of `0` rejects every group
    /// and class.
    ///
    /// The default for this is `250`.
    pub fn nest_limit(self, limit: u32) -> Config {
        Config { nest_limit: limit, ..self }
    }

    /// Returns whether case insensitive matching is enabled.
    pub fn get_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Returns the configured nest limit.
    pub fn get_nest_limit(&self) -> u32 {
        self.nest_limit
    }
}

/// A compiled pattern.
///
/// A pattern owns the arena of nodes that its source text compiled to, and
/// remembers two entry points into it:
///
/// * [`Pattern::match_root`] is where an anchored match starts. Every path
///   from it ends at the `LastAccept` node.
/// * [`Pattern::root`] is where an unanchored scan starts. It is usually a
///   `Start` node leading to the match root, a Boyer-Moore node when the
///   pattern begins with a long literal, or the match root itself when the
///   pattern begins with `^`.
///
/// # Example
///
/// ```
/// use regex_graph::{NodeKind, Pattern};
///
/// let pat = Pattern::new("foo+bar").unwrap();
/// assert_eq!(pat.as_str(), "foo+bar");
/// assert!(!pat.is_case_insensitive());
/// assert!(matches!(pat.node(pat.root()).kind(), NodeKind::Start));
/// ```
#[derive(Clone)]
pub struct Pattern {
    pattern: String,
    case_insensitive: bool,
    graph: Graph,
    root: NodeId,
    match_root: NodeId,
}

impl Pattern {
    /// Compile a pattern with the default configuration.
    pub fn new(pattern: &str) -> Result<Pattern, Error> {
        PatternBuilder::new(pattern).build()
    }

    fn with_config(config: Config, pattern: &str) -> Result<Pattern, Error> {
        debug!("compiling {:?} with {:?}", pattern, config);
        let (mut graph, match_root) = Parser::new(config, pattern)
            .parse()
            .map_err(|err| {
                debug!("failed to compile {:?}: {}", pattern, err.kind());
                err
            })?;
        let root = optimize::root(&mut graph, match_root);
        debug_assert!(
            graph.check(root).is_ok(),
            "malformed graph for {:?}: {:?}",
            pattern,
            graph.check(root),
        );
        debug!(
            "compiled {:?} into {} nodes (root {:?}, match root {:?})",
            pattern,
            graph.len(),
            root,
            match_root,
        );
        trace!("{:?}", graph);
        Ok(Pattern {
            pattern: pattern.to_string(),
            case_insensitive: config.case_insensitive,
            graph,
            root,
            match_root,
        })
    }

    /// Returns the source text this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if this pattern was compiled case insensitively.
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// The entry point for unanchored scanning.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The entry point for anchored matching.
    pub fn match_root(&self) -> NodeId {
        self.match_root
    }

    /// The arena holding every node of this pattern.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the node with the given identifier.
    ///
    /// This panics if the identifier does not belong to this pattern.
    pub fn node(&self, id: NodeId) -> &Node {
        self.graph.node(id)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pattern({:?})", self.pattern)?;
        writeln!(f, "root: {:?}", self.root)?;
        writeln!(f, "match_root: {:?}", self.match_root)?;
        write!(f, "{:?}", self.graph)
    }
}

/// A configurable builder for a [`Pattern`].
///
/// # Example
///
/// ```
/// use regex_graph::{ErrorKind, PatternBuilder};
///
/// let pat = PatternBuilder::new("Σ+")
///     .case_insensitive(true)
///     .build()
///     .unwrap();
/// assert!(pat.is_case_insensitive());
///
/// let err = PatternBuilder::new("((a))").nest_limit(1).build().unwrap_err();
/// assert_eq!(err.kind(), &ErrorKind::NestLimitExceeded(1));
/// ```
#[derive(Debug)]
pub struct PatternBuilder {
    pattern: String,
    config: Config,
}

impl PatternBuilder {
    /// Create a new builder with a default configuration for the given
    /// pattern.
    ///
    /// If the pattern is invalid, then an error will be returned when
    /// [`PatternBuilder::build`] is called.
    pub fn new(pattern: &str) -> PatternBuilder {
        PatternBuilder { pattern: pattern.to_string(), config: Config::new() }
    }

    /// Compiles the pattern given to `PatternBuilder::new` with the
    /// configuration set on this builder.
    pub fn build(&self) -> Result<Pattern, Error> {
        Pattern::with_config(self.config, &self.pattern)
    }

    /// Replace the whole configuration of this builder.
    pub fn config(&mut self, config: Config) -> &mut PatternBuilder {
        self.config = config;
        self
    }

    /// This configures whether literals, classes and families match case
    /// insensitively.
    ///
    /// The default for this is `false`.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut PatternBuilder {
        self.config = self.config.case_insensitive(yes);
        self
    }

    /// Set the nesting limit for groups and classes.
    ///
    /// The default for this is `250`.
    pub fn nest_limit(&mut self, limit: u32) -> &mut PatternBuilder {
        self.config = self.config.nest_limit(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, NodeKind};

    use super::*;

    #[test]
    fn roots() {
        let pat = Pattern::new("").unwrap();
        assert_eq!(pat.match_root(), NodeId::LAST_ACCEPT);
        assert_eq!(*pat.node(pat.root()).kind(), NodeKind::Start);
        assert_eq!(pat.node(pat.root()).next(), Some(NodeId::LAST_ACCEPT));

        let pat = Pattern::new("^abc").unwrap();
        assert_eq!(pat.root(), pat.match_root());

        let pat = Pattern::new("hello").unwrap();
        let root = pat.node(pat.root());
        assert!(matches!(root.kind(), NodeKind::BoyerMoore(_)));
        assert_ne!(pat.root(), pat.match_root());
    }

    #[test]
    fn display_is_source() {
        let pat = Pattern::new(r"a(b|c)*\d").unwrap();
        assert_eq!(pat.to_string(), r"a(b|c)*\d");
    }

    #[test]
    fn debug_lists_nodes() {
        let pat = Pattern::new("ab").unwrap();
        let dbg = format!("{:?}", pat);
        assert!(dbg.starts_with("Pattern(\"ab\")\n"), "{}", dbg);
        assert!(dbg.contains("Slice"), "{}", dbg);
    }

    #[test]
    fn builder_settings() {
        let mut builder = PatternBuilder::new("abc");
        builder.case_insensitive(true);
        let pat = builder.build().unwrap();
        assert!(pat.is_case_insensitive());
        assert!(matches!(
            pat.node(pat.match_root()).kind(),
            NodeKind::SliceFolded(_)
        ));

        builder.config(Config::new());
        assert!(!builder.build().unwrap().is_case_insensitive());

        let err =
            PatternBuilder::new("[a]").nest_limit(0).build().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::NestLimitExceeded(0));
    }
}
