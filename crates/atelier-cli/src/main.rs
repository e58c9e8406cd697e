//! Atelier CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use atelier_cli::cli::Cli;
use atelier_cli::commands;

fn main() {
    // Load .env.local if it exists (for ATELIER_STATE_DIR etc.)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let state_dir = cli.state_dir();
    let benches_root = cli.benches_root();

    if let Err(e) = commands::execute(cli.command, &state_dir, &benches_root) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
