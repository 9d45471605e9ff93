// src/lib.rs

pub mod alert;
pub mod cli;
pub mod config;
pub mod console;
pub mod controller;
pub mod engine;
pub mod errors;
pub mod fetch;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::alert::build_sink;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, Settings, default_config_path, load_and_validate};
use crate::console::run_console;
use crate::controller::Controller;
use crate::engine::{PollContext, Poller, StatusReporter, StdoutStatusSink, run_cycle};
use crate::fetch::{FetchSettings, ReqwestFetcher};
use crate::watch::{FileSnapshotStore, SnapshotStore, WatchList};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (fatal on error, before anything is spawned)
/// - the watch list (+ optional snapshot persistence)
/// - fetcher and alert sink
/// - poller, status reporter and controller
/// - the console on stdin/stdout
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config from {:?}", config_path))?;

    if args.dry_run {
        print_dry_run(&config_path, &cfg);
        return Ok(());
    }

    let watchlist = build_watchlist(&cfg)?;
    let fetcher = Arc::new(ReqwestFetcher::new(fetch_settings(&cfg.settings))?);
    let sink = build_sink(cfg.alert())?;

    let ctx = PollContext {
        watchlist: watchlist.clone(),
        fetcher,
        sink,
        interval: cfg.settings.poll_interval,
    };

    if args.once {
        let report = run_cycle(&ctx, &CancellationToken::new()).await;
        info!(?report, "single cycle finished");
        println!("{}", watchlist.snapshot().render());
        return Ok(());
    }

    let mut poller = Poller::new(ctx);
    let reporter = StatusReporter::spawn(
        watchlist.clone(),
        cfg.settings.status_interval,
        Arc::new(StdoutStatusSink),
    );

    if cfg.settings.autostart && !args.no_autostart {
        poller.start();
    } else {
        info!("autostart disabled; use the `start` command to begin polling");
    }

    let controller = Controller::new(watchlist, poller, Some(reporter));

    // Ctrl-C → same path as `quit`.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C: {e}");
                return;
            }
            shutdown.cancel();
        });
    }

    let stdin = BufReader::new(tokio::io::stdin());
    run_console(controller, stdin, tokio::io::stdout(), shutdown).await?;
    Ok(())
}

/// Build the initial watch list from config, merged with the persisted
/// snapshot when one is configured.
pub fn build_watchlist(cfg: &ConfigFile) -> Result<WatchList> {
    let Some(path) = cfg.settings.snapshot_path.as_ref() else {
        let watchlist = WatchList::new();
        watchlist.seed(cfg.targets());
        return Ok(watchlist);
    };

    let store = Arc::new(FileSnapshotStore::new(path));
    let persisted = store
        .load()
        .with_context(|| format!("reading persisted watch list from {:?}", path))?;

    let watchlist = WatchList::with_store(store);
    watchlist.seed(cfg.targets());
    watchlist.restore(persisted);
    Ok(watchlist)
}

pub fn fetch_settings(settings: &Settings) -> FetchSettings {
    FetchSettings {
        connect_timeout: settings.connect_timeout,
        request_timeout: settings.request_timeout,
        max_bytes: settings.max_body_bytes,
        ..FetchSettings::default()
    }
}

/// Simple dry-run output: print settings and targets.
fn print_dry_run(path: &Path, cfg: &ConfigFile) {
    println!("sitewatch dry-run ({})", path.display());
    println!("  config.poll_interval = {:?}", cfg.settings.poll_interval);
    println!("  config.status_interval = {:?}", cfg.settings.status_interval);
    println!("  config.request_timeout = {:?}", cfg.settings.request_timeout);
    println!("  config.autostart = {}", cfg.settings.autostart);
    if let Some(ref snapshot) = cfg.settings.snapshot_path {
        println!("  config.snapshot_path = {}", snapshot.display());
    }
    println!("  alert = {:?}", cfg.alert);
    println!();

    println!("targets ({}):", cfg.targets.len());
    for target in &cfg.targets {
        println!("  - {}", target.url);
        println!("      message: {}", target.message);
    }
}
