// src/engine/poller.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::PollContext;
use crate::engine::cycle::run_cycle;
use crate::types::PollerState;

/// Handle for a running poll loop.
///
/// - `cancel` is created fresh for every start, so a previous stop never
///   leaks into the next run.
/// - `handle` is the Tokio task running [`poll_loop`].
struct ActiveLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Cancellable repeating poll task.
///
/// State machine: `Idle --start--> Running --stop--> Stopping --> Idle`.
/// `start` runs the first cycle immediately; later cycles follow after
/// `interval` of sleep.
pub struct Poller {
    ctx: PollContext,
    state: PollerState,
    active: Option<ActiveLoop>,
    cycles_completed: Arc<AtomicU64>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("state", &self.state())
            .field("cycles_completed", &self.cycles_completed())
            .finish_non_exhaustive()
    }
}

impl Poller {
    pub fn new(ctx: PollContext) -> Self {
        Self {
            ctx,
            state: PollerState::Idle,
            active: None,
            cycles_completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state. A loop that died on its own reports `Idle`.
    pub fn state(&self) -> PollerState {
        match (&self.active, self.state) {
            (Some(active), PollerState::Running) if active.handle.is_finished() => {
                PollerState::Idle
            }
            (_, state) => state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollerState::Running
    }

    /// Number of cycles that ran to completion since this poller was built.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::SeqCst)
    }

    /// Spawn the poll loop. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            warn!("poller already running; ignoring start");
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            self.ctx.clone(),
            cancel.clone(),
            Arc::clone(&self.cycles_completed),
        ));

        self.active = Some(ActiveLoop { cancel, handle });
        self.state = PollerState::Running;
        info!(interval = ?self.ctx.interval, "poller started");
        true
    }

    /// Signal cancellation and wait until the loop has exited.
    ///
    /// An in-flight fetch is not interrupted; the loop exits at the next
    /// checkpoint after it. Returns `false` if the poller was idle.
    pub async fn stop(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            warn!("poller not running; ignoring stop");
            return false;
        };

        if active.handle.is_finished() {
            warn!("poller loop had already exited");
        }

        self.state = PollerState::Stopping;
        debug!("poller stopping; waiting for in-flight cycle");
        active.cancel.cancel();

        if let Err(err) = active.handle.await {
            error!(error = %err, "poll loop terminated abnormally");
        }

        self.state = PollerState::Idle;
        info!("poller stopped");
        true
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

async fn poll_loop(ctx: PollContext, cancel: CancellationToken, cycles: Arc<AtomicU64>) {
    loop {
        let report = run_cycle(&ctx, &cancel).await;
        if report.cancelled {
            break;
        }

        let cycle = cycles.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            cycle,
            checked = report.checked,
            changed = report.changed,
            failures = report.fetch_failures,
            "poll cycle complete"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(ctx.interval) => {}
        }
    }
    debug!("poll loop exited");
}
