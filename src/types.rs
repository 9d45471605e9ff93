use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of hash bytes kept in a [`Fingerprint`] (128 bits).
pub const FINGERPRINT_BYTES: usize = 16;

/// Fixed-size summary of normalized page content.
///
/// Only ever compared for equality. Stored as lowercase hex so it can be
/// printed in status listings and persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash an already-normalized representation.
    pub fn of_content(normalized: &str) -> Self {
        let hash = blake3::hash(normalized.as_bytes());
        let hex: String = hash.as_bytes()[..FINGERPRINT_BYTES]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        Fingerprint(hex)
    }

    /// Rebuild a fingerprint from its hex form (e.g. from a snapshot file).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Fingerprint(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single monitored page.
///
/// `fingerprint` is `None` until the first successful fetch. `revision`
/// identifies this particular insertion of `url`; a replace or a
/// remove/re-add produces a new revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub url: String,
    pub fingerprint: Option<Fingerprint>,
    pub alert_message: String,
    pub revision: u64,
}

impl WatchTarget {
    /// Fingerprint as shown to humans; `-` before the first observation.
    pub fn fingerprint_display(&self) -> &str {
        self.fingerprint.as_ref().map(Fingerprint::as_str).unwrap_or("-")
    }
}

/// Lifecycle of the poller task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerState {
    #[default]
    Idle,
    Running,
    Stopping,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PollerState::Idle => "idle",
            PollerState::Running => "running",
            PollerState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// Which alert sink to build from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertProvider {
    /// Print and log the alert message.
    #[default]
    Log,
    /// Send the alert message as an SMS through Twilio.
    Twilio,
}

impl FromStr for AlertProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "log" => Ok(AlertProvider::Log),
            "twilio" | "sms" => Ok(AlertProvider::Twilio),
            other => Err(format!(
                "invalid alert provider: {other} (expected \"log\" or \"twilio\")"
            )),
        }
    }
}
