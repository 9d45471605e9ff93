// src/main.rs

use sitewatch::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("sitewatch error: {err:?}");
        std::process::exit(1);
    }
    // Tokio's stdin reader may still be parked in a blocking read (e.g. after
    // Ctrl-C); exit explicitly instead of waiting for it on runtime drop.
    std::process::exit(0);
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
