//! In-memory stand-ins for the fetcher and the sinks.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use sitewatch::alert::{AlertError, AlertFuture, AlertSink};
use sitewatch::engine::StatusSink;
use sitewatch::fetch::{FailureKind, FetchError, FetchFuture, Fetcher};
use sitewatch::types::Fingerprint;

/// Pauses a fetch of one url until the test releases it.
#[derive(Debug, Default)]
pub struct Hold {
    entered: Notify,
    release: Notify,
}

impl Hold {
    /// Resolves once a fetch for the held url is in flight.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one held fetch finish.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// A fetcher that:
/// - records every url it was asked for, in order
/// - answers from a per-url script; the last scripted answer repeats
/// - fails with `Network` for urls that have no script
/// - can park fetches of selected urls (see [`Hold`])
#[derive(Debug, Default)]
pub struct FakeFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Result<Fingerprint, FetchError>>>>,
    calls: Mutex<Vec<String>>,
    holds: Mutex<HashMap<String, Arc<Hold>>>,
}

impl FakeFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful fetch whose normalized content is `content`.
    pub fn respond(&self, url: &str, content: &str) {
        self.push(url, Ok(Fingerprint::of_content(content)));
    }

    pub fn fail(&self, url: &str, kind: FailureKind) {
        self.push(url, Err(FetchError::new(kind, "scripted failure")));
    }

    fn push(&self, url: &str, answer: Result<Fingerprint, FetchError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(answer);
    }

    /// Park every fetch of `url` until [`Hold::release`] is called.
    pub fn hold(&self, url: &str) -> Arc<Hold> {
        let hold = Arc::new(Hold::default());
        self.holds
            .lock()
            .unwrap()
            .insert(url.to_string(), Arc::clone(&hold));
        hold
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    fn next_answer(&self, url: &str) -> Result<Fingerprint, FetchError> {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(FetchError::new(FailureKind::Network, format!("no script for {url}"))),
        }
    }
}

impl Fetcher for FakeFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(url.to_string());

            let hold = self.holds.lock().unwrap().get(url).cloned();
            if let Some(hold) = hold {
                hold.entered.notify_one();
                hold.release.notified().await;
            }

            self.next_answer(url)
        })
    }
}

/// Records alert messages; can be switched to fail every delivery.
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    attempts: Mutex<Vec<String>>,
    delivered: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingAlertSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn send<'a>(&'a self, message: &'a str) -> AlertFuture<'a> {
        Box::pin(async move {
            self.attempts.lock().unwrap().push(message.to_string());
            if self.failing.load(Ordering::SeqCst) {
                return Err(AlertError::DeliveryFailed("scripted failure".to_string()));
            }
            self.delivered.lock().unwrap().push(message.to_string());
            Ok(())
        })
    }
}

/// Collects status listings.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    listings: Mutex<Vec<String>>,
}

impl RecordingStatusSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn listings(&self) -> Vec<String> {
        self.listings.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingStatusSink {
    fn emit(&self, listing: &str) {
        self.listings.lock().unwrap().push(listing.to_string());
    }
}
