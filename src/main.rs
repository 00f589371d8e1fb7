use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

mod app;
mod cli;
mod config;
mod error;
mod grid;
mod models;
mod style;

use app::{App, ConsoleProgress, RunSummary, Settings, StdinPrompt};
use cli::Cli;
use config::ConfigManager;
use error::GridError;
use grid::GfalRunner;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("gridls").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }

    let log_file = log_dir.join(format!(
        "gridls_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&log_file)?;

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gridls=info".parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();
    Ok(())
}

fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_file(path),
        None => ConfigManager::new()?,
    };
    let config = config_manager.load_config()?;
    debug!("Loaded config from {:?}", config_manager.config_path());

    let settings = Settings::from_cli(cli, &config)?;
    let progress = ConsoleProgress::new(settings.palette.clone());
    let app = App::new(
        settings,
        Box::new(GfalRunner),
        Box::new(StdinPrompt),
        Box::new(progress),
    );
    app.run(&mut io::stdout(), &mut io::stderr())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = setup_logging() {
        eprintln!("Logging disabled: {}", err);
    }
    info!("Starting gridls with {:?}", cli);

    let started = Instant::now();
    let result = run(&cli);
    if cli.time {
        println!("> Time taken {}", format_elapsed(started.elapsed().as_secs()));
    }

    match result {
        Ok(summary) if summary.is_clean() => {
            if summary.transfers.is_empty() {
                debug!("No transfer tasks were dispatched");
            } else {
                info!("{} transfer tasks succeeded", summary.transfers.succeeded());
            }
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            info!(
                "Finished with {} listing errors, {} malformed lines, {} failed tasks",
                summary.listing_errors,
                summary.malformed_lines,
                summary.transfers.failed()
            );
            for failure in summary.transfers.failures() {
                let task = &failure.task;
                tracing::error!(
                    "{:?} {} -> {} failed",
                    task.kind(),
                    task.source(),
                    task.destination().unwrap_or("-")
                );
            }
            ExitCode::from(EXIT_FAILURE)
        }
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("ERROR: {:#}", err);
            let usage = err
                .downcast_ref::<GridError>()
                .is_some_and(GridError::is_usage);
            ExitCode::from(if usage { EXIT_USAGE } else { EXIT_FAILURE })
        }
    }
}
