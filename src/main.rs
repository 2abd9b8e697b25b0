mod args;
mod charts;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use clap::Parser;
use log::{error, info};
use snafu::ErrorCompat;

use crate::args::Args;

/// Writes the log both to the standard error and to a file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn init_logging(args: &Args) -> io::Result<()> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(log_file) = &args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
    }
    builder.init();
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("Could not open the log file {:?}: {}", args.log_file, e);
        std::process::exit(1);
    }
    info!("Starting elcharts {}", env!("CARGO_PKG_VERSION"));

    let res = charts::run_charts(&args);
    if let Err(e) = res {
        error!("An error occured: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            error!("Caused by: {}", cause);
            source = cause.source();
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            error!("trace: {}", bt);
        }
        std::process::exit(1);
    }
    info!("Charts and summary done");
}
