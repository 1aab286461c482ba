use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use shim_host::{HostConfig, Runtime};

/// Run a runtime-shim guest module.
#[derive(Debug, Parser)]
#[command(name = "shim-host", version)]
struct Cli {
    /// Guest module (.wasm or .wat).
    module: PathBuf,
    /// JSON host config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Export to call after instantiation; repeatable. Overrides the config.
    #[arg(long = "entry")]
    entries: Vec<String>,
    /// Number of times to call the resume export. Overrides the config.
    #[arg(long)]
    frames: Option<u32>,
    /// Log filter, e.g. `debug` or `shim_host=trace,guest=info`.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    shim_host::logging::init(cli.log.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    if !cli.entries.is_empty() {
        config.entries = cli.entries;
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }

    let mut runtime = Runtime::from_file(&cli.module, &config)
        .with_context(|| format!("loading {}", cli.module.display()))?;
    runtime.run(&config)?;

    let stats = runtime.heap_stats();
    tracing::info!(
        pages = runtime.memory_pages(),
        allocations = stats.allocations,
        frees = stats.frees,
        bytes_allocated = stats.bytes_allocated,
        pages_grown = stats.pages_grown,
        "guest finished"
    );
    Ok(())
}
