// src/config/model.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::AlertProvider;

/// Default Twilio REST endpoint.
pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// poll_interval = "180s"
/// status_interval = "60s"
///
/// [alert]
/// provider = "log"
///
/// [[target]]
/// url = "https://example.com/"
/// message = "example.com changed"
/// ```
///
/// All sections are optional and have reasonable defaults. Nothing here is
/// validated yet; see [`ConfigFile`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Timing and runtime behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Alert provider selection and credentials from `[alert]`.
    #[serde(default)]
    pub alert: AlertSection,

    /// Watched pages from `[[target]]`, in file order.
    #[serde(default)]
    pub target: Vec<TargetConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Pause between two poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Pause between two periodic status listings.
    #[serde(default = "default_status_interval")]
    pub status_interval: String,

    /// Upper bound for a whole request, body included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,

    /// Responses larger than this fail the fetch.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    /// Where to persist the watch list. Persistence is off when unset.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Start polling as soon as the program starts.
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

fn default_poll_interval() -> String {
    "180s".to_string()
}

fn default_status_interval() -> String {
    "60s".to_string()
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

fn default_connect_timeout() -> String {
    "10s".to_string()
}

fn default_max_body_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_autostart() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            status_interval: default_status_interval(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            max_body_bytes: default_max_body_bytes(),
            snapshot_path: None,
            autostart: default_autostart(),
        }
    }
}

/// `[alert]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertSection {
    #[serde(default)]
    pub provider: AlertProvider,

    /// Required when `provider = "twilio"`.
    #[serde(default)]
    pub twilio: Option<TwilioSection>,
}

/// `[alert.twilio]` section.
#[derive(Clone, Deserialize, Default)]
pub struct TwilioSection {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    /// Sending phone number.
    #[serde(default)]
    pub from: String,
    /// Destination phone number.
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

impl fmt::Debug for TwilioSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioSection")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// `[[target]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    /// Text delivered to the alert sink when the page changes.
    pub message: String,
}

impl TargetConfig {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`, so every
/// value here has already been checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: Settings,
    pub alert: AlertConfig,
    /// Initial watch list, in configuration order, urls unique.
    pub targets: Vec<TargetConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        settings: Settings,
        alert: AlertConfig,
        targets: Vec<TargetConfig>,
    ) -> Self {
        Self {
            settings,
            alert,
            targets,
        }
    }

    /// Initial watch list in configuration order.
    pub fn targets(&self) -> &[TargetConfig] {
        &self.targets
    }

    pub fn alert(&self) -> &AlertConfig {
        &self.alert
    }
}

/// Parsed `[config]` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub poll_interval: Duration,
    pub status_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_body_bytes: u64,
    pub snapshot_path: Option<PathBuf>,
    pub autostart: bool,
}

/// Which sink alerts go to, with everything needed to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertConfig {
    Log,
    Twilio(TwilioCredentials),
}

/// Credentials for the Twilio Messages API.
#[derive(Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
    pub api_base: String,
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("api_base", &self.api_base)
            .finish()
    }
}
