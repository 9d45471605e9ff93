#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sitewatch::alert::AlertSink;
use sitewatch::engine::PollContext;
use sitewatch::fetch::Fetcher;
use sitewatch::watch::WatchList;
use sitewatch::config::{ConfigFile, RawConfigFile, TargetConfig, TwilioSection};
use sitewatch::types::AlertProvider;

use crate::fakes::{FakeFetcher, RecordingAlertSink};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_target(mut self, url: &str, message: &str) -> Self {
        self.config.target.push(TargetConfig::new(url, message));
        self
    }

    pub fn poll_interval(mut self, value: &str) -> Self {
        self.config.config.poll_interval = value.to_string();
        self
    }

    pub fn status_interval(mut self, value: &str) -> Self {
        self.config.config.status_interval = value.to_string();
        self
    }

    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config.snapshot_path = Some(path.into());
        self
    }

    pub fn autostart(mut self, val: bool) -> Self {
        self.config.config.autostart = val;
        self
    }

    pub fn twilio(mut self, account_sid: &str, auth_token: &str, from: &str, to: &str) -> Self {
        self.config.alert.provider = AlertProvider::Twilio;
        self.config.alert.twilio = Some(TwilioSection {
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            api_base: None,
        });
        self
    }

    /// The raw config, for tests that exercise validation failures.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire a `PollContext` from fakes.
pub fn poll_context(
    watchlist: &WatchList,
    fetcher: &Arc<FakeFetcher>,
    sink: &Arc<RecordingAlertSink>,
    interval: Duration,
) -> PollContext {
    PollContext {
        watchlist: watchlist.clone(),
        fetcher: Arc::clone(fetcher) as Arc<dyn Fetcher>,
        sink: Arc::clone(sink) as Arc<dyn AlertSink>,
        interval,
    }
}
