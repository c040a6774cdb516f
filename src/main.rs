//! Tilewalk - resumable walker for tile-list pages
//!
//! Control commands operate on the progress record in the state directory;
//! `run` attaches to a browser and drives the walk.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use tilewalk::{
    resolve_state_dir, ControlOutcome, Controls, FileStore, PageClassifier, ProgressStore,
    WalkConfig, WalkError,
};

#[derive(Parser)]
#[command(name = "tilewalk")]
#[command(version)]
#[command(about = "Resumable walker that opens every tile on a list page", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// State directory holding the progress record and tilewalk.toml
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Config file (defaults to <state-dir>/tilewalk.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh walk at the first item
    Start {
        /// Current page location; must be the list page
        #[arg(long)]
        url: String,
    },

    /// Continue a stopped walk where it left off
    Resume,

    /// Stop the walk at the next tick
    Stop,

    /// Delete the progress record
    Reset,

    /// Show the progress record
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a location is classified
    Classify {
        /// Page location to classify
        url: String,
    },

    /// Attach to a running browser and drive the walk until Ctrl-C
    Run {
        /// DevTools websocket URL (overrides [browser].ws_url)
        #[arg(long, value_name = "URL")]
        ws: Option<String>,

        /// Start a fresh walk before ticking
        #[arg(long, conflicts_with = "resume")]
        start: bool,

        /// Resume the stored walk before ticking
        #[arg(long)]
        resume: bool,

        /// Tick period in milliseconds (overrides [schedule].period_ms)
        #[arg(long, value_name = "MS")]
        period_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "tilewalk=debug,info"
    } else {
        "tilewalk=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let state_dir = resolve_state_dir(cli.state_dir.as_deref());
    let config = match WalkConfig::load(cli.config.as_deref(), &state_dir) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };
    let store = ProgressStore::new(
        Arc::new(FileStore::new(&state_dir)),
        config.store.key.clone(),
    );
    let classifier = match PageClassifier::from_config(&config.page) {
        Ok(classifier) => classifier,
        Err(e) => exit_with(e),
    };
    let controls = Controls::new(store.clone(), classifier);

    match cli.command {
        Commands::Start { url } => report(controls.start(&url)),
        Commands::Resume => report(controls.resume()),
        Commands::Stop => report(controls.stop()),
        Commands::Reset => report(controls.reset()),

        Commands::Status { json } => {
            let status = controls.status().unwrap_or_else(|e| exit_with(e));
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", "Tilewalk Status".bold());
                println!("{}", "─".repeat(40));
                println!("State dir: {}", state_dir.display());
                println!("{}", status);
            }
        }

        Commands::Classify { url } => {
            println!("{}", controls.classifier().classify(&url));
        }

        Commands::Run {
            ws,
            start,
            resume,
            period_ms,
        } => {
            let mut config = config;
            if ws.is_some() {
                config.browser.ws_url = ws;
            }
            if let Some(period_ms) = period_ms {
                config.schedule.period_ms = period_ms;
            }
            if let Err(e) = run(config, store, start, resume).await {
                exit_with(e);
            }
        }
    }

    Ok(())
}

/// Print a control outcome. Refusals exit with status 2.
fn report(outcome: tilewalk::Result<ControlOutcome>) {
    let outcome = outcome.unwrap_or_else(|e| exit_with(e));
    let line = match &outcome {
        ControlOutcome::Started => format!("{} Walk started at item 1", "✓".green().bold()),
        ControlOutcome::Resumed { index } => {
            format!("{} Resuming at index {}", "✓".green().bold(), index)
        }
        ControlOutcome::Stopped { index } => {
            format!("{} Stopped at index {}", "✓".green().bold(), index)
        }
        ControlOutcome::AlreadyIdle => format!("{} No progress record; nothing to stop", "•".dimmed()),
        ControlOutcome::Reset => format!("{} Progress record deleted", "✓".green().bold()),
        ControlOutcome::NotOnList { location } => format!(
            "{} Not on the list page ({}). Go to the list page first.",
            "✗".red().bold(),
            location
        ),
        ControlOutcome::NoRecord => format!(
            "{} No progress record. Run start first.",
            "✗".red().bold()
        ),
    };
    println!("{}", line);

    if !outcome.is_applied() {
        std::process::exit(2);
    }
}

fn exit_with(err: WalkError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);
    std::process::exit(err.exit_code());
}

#[cfg(feature = "chrome")]
async fn run(
    config: WalkConfig,
    store: ProgressStore,
    start: bool,
    resume: bool,
) -> tilewalk::Result<()> {
    use tilewalk::{Automaton, ChromeDriver};
    use tracing::info;

    let driver = Arc::new(ChromeDriver::attach(&config.browser, &config.page).await?);
    let walker = Arc::new(Automaton::new(driver, store, &config)?);

    if start {
        report(walker.start().await);
    } else if resume {
        report(walker.resume());
    }

    match walker.status()?.record {
        Some(record) if record.running => info!("Loaded. Walking from item {}.", record.display_position()),
        Some(_) => info!("Loaded. Walk is stopped; run `tilewalk resume` to continue."),
        None => info!("Loaded. Open the list page and run `tilewalk start --url <URL>`."),
    }

    let handle = walker.spawn();
    tokio::signal::ctrl_c().await?;
    info!("Shutting down after the current tick");
    let stats = handle.shutdown().await?;
    info!(
        "Ran {} ticks ({} failed, {} panicked)",
        stats.ticks, stats.failures, stats.panics
    );
    Ok(())
}

#[cfg(not(feature = "chrome"))]
async fn run(
    _config: WalkConfig,
    _store: ProgressStore,
    _start: bool,
    _resume: bool,
) -> tilewalk::Result<()> {
    eprintln!(
        "{} this build has no browser driver; rebuild with `--features chrome`",
        "Error:".red().bold()
    );
    std::process::exit(1);
}
