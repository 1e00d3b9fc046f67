#![cfg_attr(not(windows), allow(dead_code))]

mod cli;
mod repl;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memscan::config::{load_config, validate_config, Config, ConfigLoader};

use crate::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::new(path).load()?,
        None => load_config()?,
    };
    validate_config(&config)?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting memscan v{}", env!("CARGO_PKG_VERSION"));

    run(args, config).await
}

#[cfg(not(windows))]
async fn run(_args: Args, _config: Config) -> Result<()> {
    anyhow::bail!("memscan only supports the Windows platform");
}

#[cfg(windows)]
async fn run(args: Args, config: Config) -> Result<()> {
    use anyhow::Context;
    use memscan::{MonitorOptions, ScanValue, Scanner, WindowsProvider};
    use std::io;

    let provider = WindowsProvider::with_candidate_capacity(config.scanner.candidate_capacity);
    let pid = match (args.pid, &args.name) {
        (Some(pid), _) => pid,
        (None, Some(name)) => Scanner::find_process_id_by_name(&provider, name)
            .with_context(|| format!("no running process named {}", name))?,
        (None, None) => anyhow::bail!("either --pid or --name is required"),
    };
    let value = ScanValue::parse(&args.value, args.value_type)?;
    let options = MonitorOptions::from(&config.monitor);
    let json = args.json;

    info!(pid, %value, "scanning");
    let session = tokio::task::spawn_blocking(move || -> Result<()> {
        let mut scanner = Scanner::open(provider, pid)?;
        let mut session = scanner.scan(value)?;
        let stdin = io::stdin();
        let stdout = io::stdout();
        repl::run(&mut session, stdin.lock(), stdout.lock(), &options, json)
    });

    tokio::select! {
        result = session => result?,
        _ = tokio::signal::ctrl_c() => {
            // The blocking session cannot be interrupted; leave without it
            info!("Interrupted, shutting down memscan");
            std::process::exit(130);
        }
    }
}
