use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

pub mod common;
pub mod patterns;
pub mod syntax;

/// A group of flags that a command can hand its arguments to.
pub trait Configurable: Debug {
    /// Handle `arg` if it belongs to this group, pulling its value from `p`
    /// when it has one. Returns false if the argument isn't recognized.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    fn usage(&self) -> &[Usage];
}

/// Feed every remaining argument to the first target that recognizes it.
///
/// `-h` and `--help` turn the given usage text into an error, with the
/// `%options%` placeholder replaced by the short or long documentation of
/// every target's flags.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    while let Some(arg) = p.next()? {
        if let Arg::Short('h') | Arg::Long("help") = arg {
            let mut usages: Vec<Usage> = targets
                .iter()
                .flat_map(|t| t.usage().iter().copied())
                .collect();
            usages.sort_by_key(|u| u.sort_key());
            let options = if arg == Arg::Short('h') {
                Usage::short(&usages)
            } else {
                Usage::long(&usages)
            };
            anyhow::bail!("{}", usage.replace("%options%", &options).trim());
        }
        // Long flag names borrow from the parser, so they're copied out
        // before the parser is handed to the targets.
        let long_flag: Option<String> = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match (long_flag.as_deref(), arg) {
            (Some(flag), _) => Arg::Long(flag),
            (None, Arg::Short(c)) => Arg::Short(c),
            (None, Arg::Value(value)) => Arg::Value(value),
            (None, Arg::Long(_)) => unreachable!(),
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

/// Parses the next argument as a command name. `-h`/`--help`, or no
/// argument at all, turns the usage text into an error.
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let cmd = match p.next()? {
        None | Some(Arg::Short('h')) | Some(Arg::Long("help")) => {
            anyhow::bail!("{usage}")
        }
        Some(Arg::Value(cmd)) => cmd.string()?,
        Some(arg) => return Err(arg.unexpected().into()),
    };
    Ok(cmd)
}

/// Parses the value of the flag named `flag_name` into a `T`. Errors
/// mention the flag.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let value = p.value().context(flag_name)?;
    let value = value.string().context(flag_name)?;
    value.parse().map_err(|err| anyhow::Error::msg(err).context(flag_name))
}

/// The documentation of a single flag.
///
/// `Usage::short` and `Usage::long` format a list of these into the
/// `%options%` section of a usage message.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// How the flag is written, e.g., `-i, --case-insensitive`.
    pub format: &'static str,
    /// A one line description.
    pub short: &'static str,
    /// A description of any length. Paragraphs are separated by blank lines
    /// and re-wrapped when printed.
    pub long: &'static str,
}

impl Usage {
    pub const fn new(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { format, short, long }
    }

    /// Flags sort by their long name when they have one.
    fn sort_key(&self) -> &'static str {
        self.format.split_once(", ").map_or(self.format, |(_, long)| long)
    }

    /// Format a two column table of flag formats and short descriptions.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let Some(max_len) = usages.iter().map(|u| u.format.len()).max() else {
            return result;
        };
        for usage in usages.iter() {
            let padding = " ".repeat(MIN_SPACE + max_len - usage.format.len());
            // Writing to a String never fails.
            let _ = writeln!(
                result,
                "    {}{}{}",
                usage.format, padding, usage.short
            );
        }
        result
    }

    /// Format each flag followed by its long description, wrapped and
    /// indented below it.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            result.push_str("    ");
            result.push_str(usage.format);
            result.push('\n');
            for (j, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if j > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace('\n', " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(args: &[&str]) -> Parser {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        Parser::from_args(args)
    }

    const USAGES: &[Usage] = &[
        Usage::new("--zeta", "Last flag.", "Zeta."),
        Usage::new(
            "-a, --alpha <n>",
            "First flag.",
            "Alpha takes a number.\n\nIt has a second paragraph.",
        ),
    ];

    #[test]
    fn short_usage_aligns_descriptions() {
        let out = Usage::short(USAGES);
        assert_eq!(
            out,
            "    --zeta           Last flag.\n    \
             -a, --alpha <n>  First flag.\n"
        );
        assert_eq!(Usage::short(&[]), "");
    }

    #[test]
    fn long_usage_wraps_paragraphs() {
        let out = Usage::long(&USAGES[1..]);
        assert_eq!(
            out,
            "    -a, --alpha <n>\n        Alpha takes a number.\n\n        \
             It has a second paragraph.\n"
        );
    }

    #[test]
    fn sorted_by_long_name() {
        let mut usages = USAGES.to_vec();
        usages.sort_by_key(|u| u.sort_key());
        assert_eq!(usages[0].format, "-a, --alpha <n>");
    }

    #[test]
    fn command_names() {
        let mut p = parser(&["debug", "graph"]);
        assert_eq!(next_as_command("usage", &mut p).unwrap(), "debug");
        assert_eq!(next_as_command("usage", &mut p).unwrap(), "graph");
        let err = next_as_command("  usage\n", &mut p).unwrap_err();
        assert_eq!(err.to_string(), "usage");

        let mut p = parser(&["--help"]);
        assert!(next_as_command("usage", &mut p).is_err());
    }

    #[test]
    fn parse_values() {
        let mut p = parser(&["--nest-limit", "7"]);
        assert_eq!(p.next().unwrap(), Some(Arg::Long("nest-limit")));
        let n: u32 = parse(&mut p, "--nest-limit").unwrap();
        assert_eq!(n, 7);

        let mut p = parser(&["--nest-limit", "many"]);
        p.next().unwrap();
        let err = parse::<u32>(&mut p, "--nest-limit").unwrap_err();
        assert!(format!("{:#}", err).starts_with("--nest-limit: "));
    }
}
