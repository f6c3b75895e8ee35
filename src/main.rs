use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dsmeta::cli::Args;

fn main() {
    let args = Args::parse();

    // stdout carries reports and the protocol channel, so logs go to stderr.
    let default_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match dsmeta::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(3);
        }
    }
}
