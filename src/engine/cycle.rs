// src/engine/cycle.rs

//! One pass over the watch list.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::{Decision, PollContext, decide};
use crate::types::WatchTarget;

/// Tally of what happened during one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Targets whose fetch was attempted.
    pub checked: usize,
    pub baselined: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub fetch_failures: usize,
    /// Changes whose alert could not be delivered.
    pub alert_failures: usize,
    /// Results dropped because the target was removed or replaced meanwhile.
    pub discarded: usize,
    /// The cycle stopped early because cancellation was requested.
    pub cancelled: bool,
}

/// Poll every target of a fresh snapshot once, in insertion order.
///
/// Targets added after the snapshot was taken wait for the next cycle.
/// `cancel` is checked before each target; an in-flight fetch is always
/// allowed to finish (or time out) on its own.
pub async fn run_cycle(ctx: &PollContext, cancel: &CancellationToken) -> CycleReport {
    let snapshot = ctx.watchlist.snapshot();
    let mut report = CycleReport::default();

    debug!(targets = snapshot.len(), "poll cycle started");

    for target in &snapshot {
        if cancel.is_cancelled() {
            info!(
                remaining = snapshot.len() - report.checked,
                "cancellation requested; abandoning cycle"
            );
            report.cancelled = true;
            break;
        }

        process_target(ctx, target, &mut report).await;
    }

    debug!(?report, "poll cycle finished");
    report
}

/// Fetch, compare, alert and store for a single target.
async fn process_target(ctx: &PollContext, target: &WatchTarget, report: &mut CycleReport) {
    report.checked += 1;

    let fresh = match ctx.fetcher.fetch(&target.url).await {
        Ok(fp) => fp,
        Err(err) => {
            warn!(url = %target.url, error = %err, "error while accessing page; skipping this cycle");
            report.fetch_failures += 1;
            return;
        }
    };

    let decision = decide(target.fingerprint.as_ref(), &fresh);
    match decision {
        Decision::Unchanged => {
            report.unchanged += 1;
            return;
        }
        Decision::Baseline => {
            debug!(url = %target.url, fingerprint = %fresh, "baseline established");
            report.baselined += 1;
        }
        Decision::Changed => {
            if !ctx.watchlist.is_current(target) {
                debug!(url = %target.url, "target removed mid-cycle; not alerting");
                report.discarded += 1;
                return;
            }
            info!(url = %target.url, "Change detected on {}, sending alert", target.url);
            report.changed += 1;
            if let Err(err) = ctx.sink.send(&target.alert_message).await {
                warn!(url = %target.url, error = %err, "alert delivery failed");
                report.alert_failures += 1;
            }
        }
    }

    // Stored whatever the alert outcome was. The update may write the
    // snapshot file, so it runs off the async workers.
    let watchlist = ctx.watchlist.clone();
    let observed = target.clone();
    let stored =
        tokio::task::spawn_blocking(move || watchlist.update_fingerprint(&observed, fresh)).await;
    match stored {
        Ok(true) => {}
        Ok(false) => report.discarded += 1,
        Err(err) => {
            error!(url = %target.url, error = %err, "fingerprint update task failed");
            report.discarded += 1;
        }
    }
}
