//! `cmdforge` — the command-line surface over the generation pipeline
//!. Thin: argument parsing, config/credential/audit wiring, and
//! dispatch. The pipeline itself lives in `cmdforge-core::manager`.

mod cli;
mod commands;
mod config;
mod error_report;
mod paths;

use clap::Parser;
use cmdforge_core::error::AppError;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::error::Severity;
use tracing::error;

use crate::cli::Cli;
use crate::cli::Command;
use crate::cli::ConfigAction;
use crate::cli::UpdateAction;

/// Translates an unwinding panic into the same Critical/Validation error
/// shape every other failure in the pipeline reports, rather than letting
/// the default panic message reach the user raw.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        let location = info.location().map(|l| l.to_string()).unwrap_or_else(|| "unknown location".to_string());

        let err = AppError::new(ErrorKind::Validation, "cmdforge-cli", "panic_barrier", "an unexpected internal error occurred")
            .with_severity(Severity::Critical)
            .with_context("panic_payload", payload)
            .with_context("panic_location", location);

        error!(kind = ?err.kind, severity = ?err.severity, "{err}");
        eprintln!("Application failed: {err}");
    }));
}

fn main() -> std::process::ExitCode {
    install_panic_hook();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::from_default_env()
        })
        .with_writer(std::io::stderr)
        .init();

    let verbose = cli.verbose;
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Application failed: could not start the async runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error_report::report(&err, verbose);
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_dir = paths::config_dir()?;
    let config_path = paths::config_file(&config_dir);

    match &cli.command {
        Some(Command::Generate { text }) => {
            let config = config::load(&config_path)?;
            commands::generate::run(&cli, text, &config_dir, &config).await
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Setup => commands::config_cmd::setup(),
            ConfigAction::Show => commands::config_cmd::show(&config_path),
            ConfigAction::Reset => commands::config_cmd::reset(&config_path),
        },
        Some(Command::Session) => commands::stubs::session(),
        Some(Command::Update { action, .. }) => match action {
            UpdateAction::Check | UpdateAction::Install => commands::stubs::update(),
        },
        Some(Command::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Completion { shell }) => {
            commands::completion::run(*shell);
            Ok(())
        }
        None => match &cli.text {
            Some(text) => {
                let config = config::load(&config_path)?;
                commands::generate::run(&cli, text, &config_dir, &config).await
            }
            None => anyhow::bail!("no request or subcommand given; run `cmdforge --help`"),
        },
    }
}
