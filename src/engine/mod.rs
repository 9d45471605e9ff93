// src/engine/mod.rs

//! Polling engine for sitewatch.
//!
//! This module ties together:
//! - the per-target decision ([`decide`]), a pure function with no IO
//! - one pass over a snapshot of the watch list ([`cycle::run_cycle`])
//! - the cancellable repeating task around it ([`poller::Poller`])
//! - the independent periodic status listing ([`status::StatusReporter`])
//!
//! Cancellation is cooperative: it is checked between targets and while
//! sleeping, never in the middle of a fetch.

use std::sync::Arc;
use std::time::Duration;

use crate::alert::AlertSink;
use crate::fetch::Fetcher;
use crate::types::Fingerprint;
use crate::watch::WatchList;

pub mod cycle;
pub mod poller;
pub mod status;

pub use cycle::{CycleReport, run_cycle};
pub use poller::Poller;
pub use status::{StatusReporter, StatusSink, StdoutStatusSink};

/// What a fresh fingerprint means for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// First successful observation: store it, never alert.
    Baseline,
    /// Same content as last time: nothing to do.
    Unchanged,
    /// Content differs from the stored fingerprint: alert, then store.
    Changed,
}

/// Compare a stored fingerprint with a freshly fetched one.
pub fn decide(stored: Option<&Fingerprint>, fresh: &Fingerprint) -> Decision {
    match stored {
        None => Decision::Baseline,
        Some(old) if old == fresh => Decision::Unchanged,
        Some(_) => Decision::Changed,
    }
}

/// Everything a poll cycle needs. Cheap to clone.
#[derive(Clone)]
pub struct PollContext {
    pub watchlist: WatchList,
    pub fetcher: Arc<dyn Fetcher>,
    pub sink: Arc<dyn AlertSink>,
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
}

impl std::fmt::Debug for PollContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollContext")
            .field("watchlist", &self.watchlist)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
