//! GENOVISTA - terminal workspace for remotely stored DNA sequences.
//!
//! ## Usage
//!
//! ```bash
//! genovista                                  # service at http://localhost:8000
//! genovista --api-base http://lab:8000       # or GENOVISTA_API_BASE
//! genovista --config genovista.toml
//! genovista --list                           # print the stored sequences and exit
//! ```
//!
//! ## Keys
//!
//! - `j/k`: Move in the list, `Enter`: select
//! - `n/e/d`: New, edit, delete
//! - `c/x/g/f/m`: Analyses
//! - `:q`: Quit
//! - `?`: Help

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use genovista::config::{FileConfig, Settings};
use genovista::controller::run_app;
use genovista::dispatch::Dispatcher;
use genovista::gateway::Gateway;
use genovista::logging;
use genovista::ui::glyphs;

/// Runs list mode: fetch the collection once and print one line per sequence.
fn run_list_mode(dispatcher: &Dispatcher) -> Result<()> {
    let items = dispatcher
        .block_on(dispatcher.gateway().list())
        .context("Could not load sequences")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for item in &items {
        writeln!(
            handle,
            "{}\t{}\t{}{}",
            item.id,
            item.length_label(),
            item.preview,
            if item.compressed { "\tcompressed" } else { "" }
        )?;
    }
    eprintln!("{} sequences", items.len());
    Ok(())
}

/// GENOVISTA - browse, edit and analyze DNA sequences stored on a remote service
///
/// Opens an interactive workspace by default.
/// With --list, prints the stored sequences to stdout and exits.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base address of the sequence service [default: http://localhost:8000]
    #[arg(short = 'a', long = "api-base", env = "GENOVISTA_API_BASE")]
    api_base: Option<String>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Event poll interval in milliseconds [default: 50]
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Log file (defaults to a fresh file in the temp directory)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// TOML config file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Use Unicode glyphs for markers
    #[arg(long = "fancy")]
    fancy: bool,

    /// Print the stored sequences and exit
    #[arg(short = 'l', long = "list")]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file = args.config.as_ref().map(FileConfig::load).transpose()?;
    let cli = FileConfig {
        api_base: args.api_base,
        timeout_secs: args.timeout_secs,
        tick_ms: args.tick_ms,
        log_file: args.log_file,
    };
    let settings = Settings::resolve(cli, file)?;

    let log_path = logging::init(settings.log_file.as_deref()).context("Could not open log file")?;
    info!("Logging to {}", log_path.display());

    let gateway = Gateway::new(&settings.api_base, settings.timeout)?;
    let dispatcher = Dispatcher::new(gateway).context("Could not start the I/O runtime")?;

    if args.list {
        run_list_mode(&dispatcher)?;
    } else {
        run_app(dispatcher, glyphs::select(args.fancy), settings.tick_rate)?;
    }

    Ok(())
}
