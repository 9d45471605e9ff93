// src/engine/status.rs

//! Periodic status listing, independent of the poller.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::watch::WatchList;

/// Where status listings go.
pub trait StatusSink: Send + Sync {
    fn emit(&self, listing: &str);
}

/// Prints listings on stdout, next to the console.
#[derive(Debug, Clone, Default)]
pub struct StdoutStatusSink;

impl StatusSink for StdoutStatusSink {
    fn emit(&self, listing: &str) {
        println!("\n{listing}");
    }
}

/// Emits a listing right away and then every `interval` until stopped.
pub struct StatusReporter {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter")
            .field("finished", &self.handle.is_finished())
            .finish_non_exhaustive()
    }
}

impl StatusReporter {
    pub fn spawn(watchlist: WatchList, interval: Duration, sink: Arc<dyn StatusSink>) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(report_loop(watchlist, interval, sink, cancel.clone()));
        info!(?interval, "status reporter started");
        Self { cancel, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            error!(error = %err, "status reporter terminated abnormally");
        }
        info!("status reporter stopped");
    }
}

async fn report_loop(
    watchlist: WatchList,
    interval: Duration,
    sink: Arc<dyn StatusSink>,
    cancel: CancellationToken,
) {
    loop {
        sink.emit(&watchlist.snapshot().render());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }
    }
    debug!("status loop exited");
}
