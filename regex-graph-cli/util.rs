use std::{
    fmt::Debug,
    io::{self, Write},
    time::{Duration, Instant},
};

/// Time an arbitrary operation.
pub fn timeit<T>(run: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let t = run();
    (t, start.elapsed())
}

/// Time an operation that can fail, returning the duration alongside the
/// successful value.
pub fn timeitr<T, E>(
    run: impl FnOnce() -> Result<T, E>,
) -> Result<(T, Duration), E> {
    let (result, time) = timeit(run);
    Ok((result?, time))
}

/// An aligned table of labeled values, printed above the main output of a
/// command.
#[derive(Debug)]
pub struct Table {
    pairs: Vec<(String, Box<dyn Debug>)>,
}

impl Table {
    pub fn empty() -> Table {
        Table { pairs: vec![] }
    }

    pub fn add<D: Debug + 'static>(&mut self, label: &str, value: D) {
        self.pairs.push((label.to_string(), Box::new(value)));
    }

    pub fn print<W: io::Write>(&self, wtr: W) -> io::Result<()> {
        let mut wtr = tabwriter::TabWriter::new(wtr)
            .alignment(tabwriter::Alignment::Right);
        for (label, value) in self.pairs.iter() {
            writeln!(wtr, "{label}:\t{value:?}")?;
        }
        wtr.flush()
    }
}
