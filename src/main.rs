use anyhow::Context;
use clap::Parser;
use decicalc::config::loader::ConfigLoader;
use decicalc::config::CalculatorConfig;
use decicalc::history::HistoryStore;
use decicalc::observer::{AutoSaveObserver, LoggingObserver};
use decicalc::repl::Repl;
use decicalc::{CalcError, CalculatorSession};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, error, trace, warn};

/// Exact-decimal calculator with history and undo/redo
#[derive(Parser)]
#[command(name = "decicalc", version)]
#[command(about = "Interactive decimal calculator with undo/redo and saved history", long_about = None)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Start with an empty history instead of restoring the saved one
    #[arg(long)]
    fresh: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        let code = e
            .downcast_ref::<CalcError>()
            .map(CalcError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let config = loader.load()?;

    init_logging(&config, cli.verbose);
    debug!("decicalc started with verbosity level: {}", cli.verbose);
    trace!("Resolved configuration: {config:?}");

    let mut session = if cli.fresh {
        CalculatorSession::new(config.clone())?
    } else {
        match CalculatorSession::open(config.clone()) {
            Ok(session) => session,
            Err(e @ CalcError::Persistence { .. }) => {
                warn!("Could not restore previous session, starting empty: {e}");
                let moved = HistoryStore::new(config.history_file()).quarantine()?;
                eprintln!(
                    "Warning: {}. The unreadable file was moved to {}",
                    e.user_message(),
                    moved.display()
                );
                CalculatorSession::new(config.clone())?
            }
            Err(e) => return Err(e.into()),
        }
    };

    session.subscribe(Box::new(LoggingObserver));
    session.subscribe(Box::new(AutoSaveObserver::new(
        HistoryStore::new(config.history_file()),
        config.auto_save,
    )));

    let use_color = !cli.no_color;
    if !use_color {
        colored::control::set_override(false);
    }

    let stdin = io::stdin();
    Repl::new(session, stdin.lock(), io::stdout().lock())
        .with_color(use_color)
        .run()
        .map(drop)
        .context("Calculator loop failed")?;
    Ok(())
}

/// Route tracing output to the log file, falling back to stderr
fn init_logging(config: &CalculatorConfig, verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match open_log_file(config) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(verbose >= 2)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(verbose >= 2)
                .with_writer(io::stderr)
                .init();
            warn!("Could not open log file, logging to stderr: {e}");
        }
    }
}

fn open_log_file(config: &CalculatorConfig) -> io::Result<File> {
    let path = config.log_file();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
