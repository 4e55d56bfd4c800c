//! gtv - Generic Transfer Value tool

use clap::Parser;
use gtv_cli::{run, Cli, Outcome};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean
    let log_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gtv_cli={log_level},gtv_core={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let outcome = run(&cli, &mut stdin.lock(), &mut stdout.lock())?;

    Ok(match outcome {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Mismatch => ExitCode::from(1),
    })
}
