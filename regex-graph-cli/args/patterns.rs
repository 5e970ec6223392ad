use std::path::PathBuf;

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

use crate::args::{Configurable, Usage};

/// Collects the patterns a command operates on, from positional arguments,
/// `-p/--pattern` flags and `-f/--pattern-file` files.
#[derive(Debug, Default)]
pub struct Config {
    patterns: Vec<String>,
    fixed_strings: bool,
}

impl Config {
    /// Returns every pattern given, in order. With `-F/--fixed-strings`,
    /// each pattern is escaped so that it compiles to its literal text.
    pub fn get(&self) -> Vec<String> {
        if self.fixed_strings {
            self.patterns.iter().map(|p| escape(p)).collect()
        } else {
            self.patterns.clone()
        }
    }

    /// Like `get`, but requires exactly one pattern.
    pub fn get_one(&self) -> anyhow::Result<String> {
        let mut pats = self.get();
        anyhow::ensure!(
            pats.len() == 1,
            "exactly one pattern is required, but {} were given",
            pats.len(),
        );
        Ok(pats.remove(0))
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('p') | Arg::Long("pattern") => {
                let pat = p.value().context("-p/--pattern needs a value")?;
                let pat = pat
                    .string()
                    .context("-p/--pattern must be valid UTF-8")?;
                self.patterns.push(pat);
            }
            Arg::Short('F') | Arg::Long("fixed-strings") => {
                self.fixed_strings = true;
            }
            Arg::Short('f') | Arg::Long("pattern-file") => {
                let path =
                    PathBuf::from(p.value().context("-f/--pattern-file")?);
                let contents =
                    std::fs::read_to_string(&path).with_context(|| {
                        format!("failed to read {}", path.display())
                    })?;
                self.patterns.extend(contents.lines().map(String::from));
            }
            Arg::Value(ref mut v) => {
                let v = std::mem::take(v);
                self.patterns
                    .push(v.string().context("patterns must be valid UTF-8")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &[Usage] = &[
            Usage::new(
                "-p, --pattern <pattern>",
                "Add a pattern.",
                r#"
Adds a pattern to the command. Patterns may also be given as positional
arguments. A pattern that starts with a '-' has to be given with this flag.

Patterns must be valid UTF-8.
"#,
            ),
            Usage::new(
                "-f, --pattern-file <path>",
                "Read patterns from a file, one per line.",
                r#"
Reads patterns from the file given, one per line. Every line is a pattern,
including empty ones.
"#,
            ),
            Usage::new(
                "-F, --fixed-strings",
                "Treat every pattern as literal text.",
                r#"
When set, every pattern is escaped before it is compiled, so that meta
characters like '+' or '(' stand for themselves.
"#,
            ),
        ];
        USAGES
    }
}

/// Escape every character that has a meaning in pattern syntax.
fn escape(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if is_meta_character(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn is_meta_character(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.'
            | '+'
            | '*'
            | '?'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '&'
            | '-'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_meta_characters() {
        assert_eq!(escape("a.b"), r"a\.b");
        assert_eq!(escape("(x|y)*"), r"\(x\|y\)\*");
        assert_eq!(escape("[a-z&&b]"), r"\[a\-z\&\&b\]");
        assert_eq!(escape("é"), "é");
    }

    #[test]
    fn escaped_patterns_compile_to_their_text() {
        let text = r"1+1=2? {yes} ^$ \o/";
        let pat = regex_graph::compile(&escape(text), false).unwrap();
        let expected: Vec<u32> = text.chars().map(u32::from).collect();
        let node = pat.node(pat.match_root());
        assert_eq!(*node.kind(), regex_graph::NodeKind::Slice(expected));
    }

    #[test]
    fn positional_and_flag_patterns() {
        let mut config = Config::default();
        let mut p = Parser::from_args(vec!["-p", "a+", "b|c", "--pattern=d"]);
        crate::args::configure(&mut p, "usage", &mut [&mut config]).unwrap();
        assert_eq!(config.get(), vec!["a+", "b|c", "d"]);
        assert!(config.get_one().is_err());

        config.fixed_strings = true;
        assert_eq!(config.get(), vec![r"a\+", r"b\|c", "d"]);
    }
}
