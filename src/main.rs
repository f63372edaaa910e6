//! rocket-bridge main entry point
//!
//! Hosts an application core that talks over stdio:
//! 1. bootstrap flags are written to stdout as one JSON line
//! 2. port messages are read from stdin, one JSON object per line
//! 3. speech batches go to the host TTS, build snapshots to disk
//!
//! Logging goes to stderr (or a file in debug mode) since stdout
//! belongs to the core.

use anyhow::Context;
use log::{error, info};
use rocket_bridge::bootstrap::SystemClock;
use rocket_bridge::config::Config;
use rocket_bridge::speech::{create_synth, Synth};
use rocket_bridge::stdio::StdioCore;
use rocket_bridge::storage::FileStorage;
use rocket_bridge::Bridge;
use std::path::PathBuf;
use std::process;
use tokio::io::BufReader;

/// Command line options
struct Options {
    debug: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut options = Options {
        debug: false,
        config: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    Ok(options)
}

fn init_logging(debug: bool) {
    if debug {
        // Debug mode: write to rocket-bridge.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("rocket-bridge.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open rocket-bridge.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Stderr)
                    .init();
            }
        }
        info!(
            "rocket-bridge {} starting (debug mode, logging to rocket-bridge.log)",
            rocket_bridge::VERSION
        );
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Stderr)
            .init();
    }
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: rocket-bridge [--debug] [--config <path>]");
            process::exit(2);
        }
    };

    init_logging(options.debug);

    if let Err(e) = run(options) {
        error!("Fatal error: {:#}", e);
        eprintln!("Fatal error: {:#}", e);
        process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    let config = match options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    info!("Configuration loaded from {:?}", config.path());

    let data_dir = config.data_dir();
    let storage = FileStorage::open(&data_dir)
        .context("opening build storage")?
        .with_quota(config.quota_bytes());
    info!("Build storage at {:?}", data_dir);

    let synth = create_synth(&config);
    info!("Speech backend: {}", synth.name());

    // The bridge is single-threaded: every handler runs on this thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime")?;

    runtime.block_on(async move {
        let mut bridge = Bridge::new(storage, synth);
        let mut core = StdioCore::new(std::io::stdout());

        let running = bridge
            .launch(&SystemClock, &mut core)
            .context("starting bridge")?;

        core.pump(BufReader::new(tokio::io::stdin()))
            .await
            .context("reading core messages")?;

        let (dispatcher, sink) = running.join().await?;
        info!(
            "Bridge stopped: {:?}, {:?}",
            dispatcher.stats(),
            sink.stats()
        );
        Ok::<(), anyhow::Error>(())
    })
}
