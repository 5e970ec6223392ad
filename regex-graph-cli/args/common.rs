use lexopt::{Arg, Parser};

use crate::args::{Configurable, Usage};

/// Flags shared by every command, controlling how much gets printed.
#[derive(Debug, Default)]
pub struct Config {
    pub quiet: bool,
    pub no_table: bool,
}

impl Config {
    pub fn table(&self) -> bool {
        !self.no_table
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('q') | Arg::Long("quiet") => self.quiet = true,
            Arg::Long("no-table") => self.no_table = true,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-q, --quiet",
                "Only print the summary table.",
                r#"
Suppress the main output of a command, e.g., the rendered graph of
'regex-graph-cli debug graph', and only print the table of properties above
it.
"#,
            ),
            Usage::new(
                "--no-table",
                "Omit the summary table.",
                r#"
Most commands print a table of properties of the compiled pattern, such as its
node count and compile time, before their main output. This flag suppresses
that table.
"#,
            ),
        ];
        USAGES
    }
}
