use anyhow::Result;
use clap::FromArgMatches;
use crmctl::api::TransportError;
use crmctl::cli::{self, Cli, LogLevel};
use crmctl::config::Config;
use crmctl::resource::registry;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: cannot open log file {}: {}", log_path.display(), err);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("crmctl {} started with log level: {:?}", crmctl::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("crmctl").join("crmctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".crmctl").join("crmctl.log");
    }
    PathBuf::from("crmctl.log")
}

fn config_path() -> PathBuf {
    Config::config_path().unwrap_or_else(|| PathBuf::from("crmctl-config.json"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let resources = registry::resource_commands();
    let matches = cli::build_cli(&resources).get_matches();

    let log_level = Cli::from_arg_matches(&matches)
        .map(|args| args.log_level)
        .unwrap_or(LogLevel::Off);
    let _log_guard = setup_logging(log_level);

    let result: Result<()> = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let stdin = io::stdin();
        let mut input = stdin.lock();
        cli::execute(&matches, &resources, &config_path(), &mut out, &mut input).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {err:#}");
            if let Some(hint) = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<TransportError>())
                .and_then(TransportError::hint)
            {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}
