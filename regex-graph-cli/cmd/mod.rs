mod check;
mod debug;

const USAGE: &str = "\
A tool for inspecting the node graphs that patterns compile to.

USAGE:
    regex-graph-cli <command> ...

COMMANDS:
    check   Compile patterns and report their errors.
    debug   Print compiled graphs, node arenas and character classes.
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    match &*cmd {
        "check" => check::run(p),
        "debug" => debug::run(p),
        unk => anyhow::bail!("unrecognized command '{unk}'"),
    }
}
