use std::{env, io::Write};

mod args;
mod cmd;
mod logger;
mod util;

fn main() -> anyhow::Result<()> {
    let level = logger::level_from_env(env::var("RUST_LOG").ok().as_deref())?;
    logger::Logger::init()?;
    log::set_max_level(level);

    if let Err(err) = cmd::run(&mut lexopt::Parser::from_env()) {
        let mut stderr = std::io::stderr();
        if env::var("RUST_BACKTRACE").map_or(false, |v| v == "1") {
            writeln!(stderr, "{:?}", err)?;
        } else {
            writeln!(stderr, "{:#}", err)?;
        }
        std::process::exit(1);
    }
    Ok(())
}
