//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("wayfarer: logging disabled: {err}");
    }
    if let Err(err) = wayfarer_cli::run() {
        eprintln!("wayfarer: {err}");
        std::process::exit(1);
    }
}
