// A bare bones stderr logger for the `log` crate. The compiler only emits
// debug and trace records when built with its `logging` feature, which this
// tool always turns on.

use log::{self, Log};

/// Logs every record it's handed to stderr, one line per record.
///
/// Filtering happens through `log::set_max_level`, never here.
#[derive(Debug)]
pub struct Logger(());

const LOGGER: &Logger = &Logger(());

impl Logger {
    /// Install this logger as the global logger.
    pub fn init() -> Result<(), log::SetLoggerError> {
        log::set_logger(LOGGER)
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => format!("|{}:{}", file, line),
            (Some(file), None) => format!("|{}", file),
            _ => String::new(),
        };
        eprintln!(
            "{}|{}{}: {}",
            record.level(),
            record.target(),
            location,
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Map the value of `RUST_LOG` to a level filter. An unset or empty
/// variable turns logging off.
pub fn level_from_env(
    rustlog: Option<&str>,
) -> anyhow::Result<log::LevelFilter> {
    let level = match rustlog.unwrap_or("") {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    Ok(level)
}
