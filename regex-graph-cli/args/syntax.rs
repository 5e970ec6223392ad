use {
    anyhow::Context,
    lexopt::{Arg, Parser},
    regex_graph::{Pattern, PatternBuilder},
};

use crate::args::{self, Configurable, Usage};

/// Exposes the knobs of `regex_graph::Config` as flags.
#[derive(Debug, Default)]
pub struct Config {
    config: regex_graph::Config,
}

impl Config {
    /// Compile a pattern with this configuration.
    pub fn compile(&self, pattern: &str) -> anyhow::Result<Pattern> {
        PatternBuilder::new(pattern)
            .config(self.config)
            .build()
            .with_context(|| format!("failed to compile pattern {pattern:?}"))
    }

    pub fn case_insensitive(&self) -> bool {
        self.config.get_case_insensitive()
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('i') | Arg::Long("case-insensitive") => {
                self.config = self.config.case_insensitive(true);
            }
            Arg::Long("nest-limit") => {
                let limit = args::parse(p, "--nest-limit")?;
                self.config = self.config.nest_limit(limit);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-i, --case-insensitive",
                "Compile patterns case insensitively.",
                r#"
Compile every pattern so that literals, classes and families match without
regard to case. Literal runs are folded with the simple Unicode case
mappings, and the cased letter categories and properties widen to each other.
"#,
            ),
            Usage::new(
                "--nest-limit <limit>",
                "Set the nesting limit of groups and classes.",
                r#"
Set the maximum depth to which groups and character classes may be nested.
Patterns that nest deeper fail to compile. The default is 250.
"#,
            ),
        ];
        USAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_reach_the_compiler() {
        let mut syntax = Config::default();
        let mut p = Parser::from_args(vec!["-i", "--nest-limit", "1"]);
        args::configure(&mut p, "usage", &mut [&mut syntax]).unwrap();
        assert!(syntax.case_insensitive());

        let pat = syntax.compile("(a)").unwrap();
        assert!(pat.is_case_insensitive());
        let err = syntax.compile("((a))").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("nesting depth of 1"), "{msg}");
    }

    #[test]
    fn bad_nest_limit() {
        let mut syntax = Config::default();
        let mut p = Parser::from_args(vec!["--nest-limit", "-1"]);
        let err =
            args::configure(&mut p, "usage", &mut [&mut syntax]).unwrap_err();
        assert!(err.to_string().contains("--nest-limit"), "{err:#}");
    }
}
