mod error;
mod models;
mod services;

use std::fs;
use std::io::{self, BufWriter};

use anyhow::Result;
use services::config_loader::{self, LoggingConfig};
use services::contest_engine::ContestEngine;
use services::session;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn prepare_log_directory(directory: &str) -> bool {
    match fs::create_dir_all(directory) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("failed to create log directory {directory}: {err}");
            false
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    // stdout carries the protocol, keep diagnostics off it
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true);

    let (file_layer, file_guard) = if logging.file_enabled {
        prepare_log_directory(&logging.directory);
        let file_appender = tracing_appender::rolling::daily(&logging.directory, &logging.file_name);
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_writer)
            .with_target(true);
        (Some(file_layer), Some(file_guard))
    } else {
        (None, None)
    };

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    file_guard
}

fn main() -> Result<()> {
    let config_path = config_loader::resolve_config_path();
    let loaded = config_loader::load_frostboard_config(&config_path)?;
    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    let _log_guard = init_tracing(&config.logging);
    info!("Starting frostboard");
    if from_file {
        info!("Loaded config from {}", config_path.display());
    } else {
        info!("{} not found, using defaults", config_path.display());
    }

    let mut engine = ContestEngine::from_config(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = session::run_session(&mut engine, stdin.lock(), BufWriter::new(stdout.lock()))?;

    if !summary.ended {
        warn!("Input ended before END command");
    }
    Ok(())
}
