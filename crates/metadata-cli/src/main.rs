mod cli;
mod config;
mod error;
mod service;

use std::process::ExitCode as ProcessExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    install_tracing(cli.log_level.as_deref());

    match service::run(cli).await {
        Ok(()) => ProcessExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "metadata-service exited with an error");
            let exit_code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ProcessExitCode::from(exit_code as u8)
        }
    }
}

/// Installs a `tracing-subscriber` `fmt` layer with an `EnvFilter` driven by
/// `RUST_LOG`, defaulting to `info` (spec §10.1).
fn install_tracing(log_level: Option<&str>) {
    let filter = log_level
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
