use std::io::{stdout, Write};

use crate::args;

const USAGE: &str = "\
Compiles every pattern given and reports, for each one, either the size of
its graph or the error that stopped compilation. Exits with an error if any
pattern failed.

USAGE:
    regex-graph-cli check [<pattern> ...]

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut common = args::common::Config::default();
    let mut patterns = args::patterns::Config::default();
    let mut syntax = args::syntax::Config::default();
    args::configure(p, USAGE, &mut [&mut common, &mut patterns, &mut syntax])?;

    let mut out = stdout().lock();
    let mut failed = 0;
    for (i, pattern) in patterns.get().iter().enumerate() {
        match syntax.compile(pattern) {
            Ok(pat) => {
                pat.graph().check(pat.root())?;
                if !common.quiet {
                    writeln!(out, "{i}: ok, {} nodes", pat.graph().len())?;
                }
            }
            Err(err) => {
                failed += 1;
                // The root cause is the compiler's caret diagnostic.
                writeln!(out, "{i}: {}", err.root_cause())?;
            }
        }
    }
    anyhow::ensure!(failed == 0, "{failed} pattern(s) failed to compile");
    Ok(())
}
