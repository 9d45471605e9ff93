// src/controller.rs

//! Command handlers behind the console.
//!
//! The controller owns the poller and the status reporter and is the only
//! place their lifecycle changes. Handlers return the text to show the user;
//! recoverable command errors (`NotFound`, `InvalidUrl`) come back as `Err`
//! and never touch any state.

use tracing::info;

use crate::config::validate_url;
use crate::engine::{Poller, StatusReporter};
use crate::errors::{Result, SitewatchError};
use crate::types::PollerState;
use crate::watch::{AddOutcome, WatchList};

#[derive(Debug)]
pub struct Controller {
    watchlist: WatchList,
    poller: Poller,
    reporter: Option<StatusReporter>,
}

impl Controller {
    pub fn new(watchlist: WatchList, poller: Poller, reporter: Option<StatusReporter>) -> Self {
        Self {
            watchlist,
            poller,
            reporter,
        }
    }

    pub fn watchlist(&self) -> &WatchList {
        &self.watchlist
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn poller_state(&self) -> PollerState {
        self.poller.state()
    }

    /// Current listing plus the poller state.
    pub fn status(&self) -> String {
        let listing = self.watchlist.snapshot().render();
        let monitoring = match self.poller.state() {
            PollerState::Running => format!(
                "Monitoring is running ({} cycles completed).",
                self.poller.cycles_completed()
            ),
            PollerState::Stopping => "Monitoring is stopping.".to_string(),
            PollerState::Idle => "Monitoring is stopped.".to_string(),
        };
        format!("{listing}\n{monitoring}")
    }

    pub fn start(&mut self) -> Result<String> {
        if self.poller.start() {
            Ok("Monitoring started.".to_string())
        } else {
            Ok("Monitoring is already running.".to_string())
        }
    }

    /// Blocks until the in-flight cycle has observed the stop.
    pub async fn stop(&mut self) -> Result<String> {
        if self.poller.stop().await {
            Ok("Monitoring stopped.".to_string())
        } else {
            Ok("Monitoring is not running.".to_string())
        }
    }

    pub fn add(&self, url: &str, alert_message: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SitewatchError::InvalidUrl("URL must not be empty".to_string()));
        }
        validate_url(url)?;

        let alert_message = alert_message.trim();
        let verb = match self.watchlist.add(url, alert_message) {
            AddOutcome::Inserted => "added",
            AddOutcome::Replaced => "replaced",
        };
        Ok(format!("{url} {verb} with custom alert: {alert_message}"))
    }

    pub fn remove(&self, url: &str) -> Result<String> {
        let url = url.trim();
        self.watchlist.remove(url)?;
        Ok(format!("{url} removed."))
    }

    /// Stop the poller and the status reporter and wait for both.
    pub async fn quit(mut self) {
        info!("shutting down");
        if self.poller.is_running() {
            self.poller.stop().await;
        }
        if let Some(reporter) = self.reporter.take() {
            reporter.stop().await;
        }
        info!("all tasks stopped");
    }
}
