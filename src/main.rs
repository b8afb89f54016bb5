use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use polytally::console::{self, OutputFormat};
use polytally::runner::{RunLoop, RunLoopConfig};
use polytally::simulator::{ProcessSimulator, ReplaySimulator, Simulator};

mod cli;
mod config;

use cli::Cli;
use config::{Backend, Config};

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("polytally")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("polytally.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn notice(cli: &Cli, message: &dyn std::fmt::Display) {
    if cli.json {
        eprintln!("{}", message);
    } else {
        println!("{}", message);
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        notice(cli, &"Verbose mode enabled".yellow());
    }

    let runs = match cli.runs {
        Some(runs) => runs,
        None => {
            let stdin = io::stdin();
            // Keep stdout clean for the JSON report
            let prompted = if cli.json {
                console::prompt_run_count(&mut stdin.lock(), &mut io::stderr())
            } else {
                console::prompt_run_count(&mut stdin.lock(), &mut io::stdout())
            };
            prompted.context("Failed to read run count")?
        }
    };

    let run_config = RunLoopConfig {
        discriminant_index: config.result.discriminant_index,
    };

    if let Some(path) = &cli.replay {
        let simulator = ReplaySimulator::open(path).context("Failed to open replay file")?;
        return run_batch(cli, config, simulator, runs, run_config).await;
    }

    match config.simulator.backend {
        Backend::Process => {
            let simulator = ProcessSimulator::new(config.simulator.process_config())
                .context("Failed to configure process simulator")?;
            if cli.is_verbose() {
                notice(cli, &format!("{} {}", "Simulator command:".cyan(), simulator.command()));
            }
            run_batch(cli, config, simulator, runs, run_config).await
        }
        Backend::Replay => {
            let path = config
                .simulator
                .replay_path
                .as_ref()
                .ok_or_else(|| eyre!("simulator.replay_path is required for the replay backend"))?;
            let simulator = ReplaySimulator::open(path).context("Failed to open replay file")?;
            run_batch(cli, config, simulator, runs, run_config).await
        }
    }
}

async fn run_batch<S: Simulator>(
    cli: &Cli,
    config: &Config,
    simulator: S,
    runs: u64,
    run_config: RunLoopConfig,
) -> Result<()> {
    let runner = RunLoop::with_config(Arc::new(simulator), run_config);

    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Plain };
    let mut out = io::stdout();
    let mut diag = io::stderr();
    console::run_and_report(&runner, runs, format, &mut out, &mut diag)
        .await
        .context("Simulator run failed")?;

    if !cli.no_pause && config.console.pause_on_exit {
        match format {
            OutputFormat::Plain => console::wait_for_key(&mut out)?,
            OutputFormat::Json => console::wait_for_key(&mut diag)?,
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
