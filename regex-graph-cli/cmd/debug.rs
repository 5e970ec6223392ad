use std::io::{stdout, Write};

use {
    lexopt::{Arg, Parser},
    regex_graph::{NodeKind, Pattern, Printer},
};

use crate::{
    args::{self, Configurable, Usage},
    util::{self, Table},
};

pub fn run(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &str = "\
Prints the compiled form of a pattern in one of several ways.

USAGE:
    regex-graph-cli debug <command> ...

COMMANDS:
    arena   Print every node of the arena, in allocation order.
    class   Print the predicate of a pattern that is a single class.
    graph   Print the graph as an indented tree.
";

    let cmd = args::next_as_command(USAGE, p)?;
    match &*cmd {
        "arena" => run_arena(p),
        "class" => run_class(p),
        "graph" => run_graph(p),
        unk => anyhow::bail!("unrecognized command '{unk}'"),
    }
}

/// Compile the one pattern given and summarize the result in a table.
fn compile(
    patterns: &args::patterns::Config,
    syntax: &args::syntax::Config,
) -> anyhow::Result<(Pattern, Table)> {
    let pattern = patterns.get_one()?;
    let mut table = Table::empty();
    let (pat, time) = util::timeitr(|| syntax.compile(&pattern))?;
    table.add("compile time", time);
    table.add("nodes", pat.graph().len());
    table.add("root", pat.root());
    table.add("match root", pat.match_root());
    table.add("case insensitive", pat.is_case_insensitive());
    Ok((pat, table))
}

fn finish(
    common: &args::common::Config,
    table: &Table,
    body: &str,
) -> anyhow::Result<()> {
    let mut out = stdout().lock();
    if common.table() {
        table.print(&mut out)?;
    }
    if !common.quiet {
        if common.table() {
            writeln!(out)?;
        }
        write!(out, "{body}")?;
    }
    Ok(())
}

fn run_graph(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &str = "\
Prints the graph of a compiled pattern as an indented tree, starting from the
root used for unanchored scanning.

USAGE:
    regex-graph-cli debug graph <pattern>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut patterns = args::patterns::Config::default();
    let mut syntax = args::syntax::Config::default();
    let mut graph = GraphConfig::default();
    args::configure(
        p,
        USAGE,
        &mut [&mut common, &mut patterns, &mut syntax, &mut graph],
    )?;

    let (pat, table) = compile(&patterns, &syntax)?;
    let root = if graph.anchored { pat.match_root() } else { pat.root() };
    let mut body = String::new();
    Printer::new().print(pat.graph(), root, &mut body)?;
    finish(&common, &table, &body)
}

fn run_arena(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &str = "\
Prints every node in the arena of a compiled pattern, along with its
successor, in the order the nodes were allocated.

USAGE:
    regex-graph-cli debug arena <pattern>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut patterns = args::patterns::Config::default();
    let mut syntax = args::syntax::Config::default();
    args::configure(p, USAGE, &mut [&mut common, &mut patterns, &mut syntax])?;

    let (pat, table) = compile(&patterns, &syntax)?;
    finish(&common, &table, &format!("{:?}", pat.graph()))
}

fn run_class(p: &mut Parser) -> anyhow::Result<()> {
    const USAGE: &str = "\
Prints the predicate of a pattern that compiles to a single character node,
e.g., '[a-z&&[^aeiou]]' or '\\p{IsGreek}'. The table counts the code points
the predicate accepts.

USAGE:
    regex-graph-cli debug class <pattern>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = args::common::Config::default();
    let mut patterns = args::patterns::Config::default();
    let mut syntax = args::syntax::Config::default();
    args::configure(p, USAGE, &mut [&mut common, &mut patterns, &mut syntax])?;

    let (pat, mut table) = compile(&patterns, &syntax)?;
    let node = pat.node(pat.match_root());
    let predicate = match *node.kind() {
        NodeKind::Char(ref pred) | NodeKind::BmpChar(ref pred) => pred,
        ref kind => anyhow::bail!(
            "pattern compiled to {} instead of a single character node",
            kind.name(),
        ),
    };
    let (accepted, time) = util::timeit(|| {
        (0..=0x10FFFF).filter(|&cp| predicate.test(cp)).count()
    });
    table.add("code points", accepted);
    table.add("count time", time);
    table.add("bmp only", predicate.is_bmp());
    finish(&common, &table, &format!("{predicate}\n"))
}

/// Flags specific to `debug graph`.
#[derive(Debug, Default)]
struct GraphConfig {
    anchored: bool,
}

impl Configurable for GraphConfig {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('a') | Arg::Long("anchored") => self.anchored = true,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[Usage::new(
            "-a, --anchored",
            "Print from the anchored match root.",
            r#"
Start printing at the match root, which is where an anchored match begins,
instead of at the root used for unanchored scanning. The two differ when the
pattern is scanned with a Start or Boyer-Moore node.
"#,
        )];
        USAGES
    }
}
