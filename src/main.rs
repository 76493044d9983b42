// SecretCLI — Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (with a
// filter that never emits secret values), and dispatches to the command
// handler. Exits non-zero on any reported error.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use secretcli::cli::{execute, Cli};

fn main() {
    // RUST_LOG=secretcli=debug for verbose output. The default keeps the
    // interactive prompts free of log noise.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("secretcli=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
