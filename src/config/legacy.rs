// src/config/legacy.rs

//! Flat `key=value` configuration format.
//!
//! ```text
//! websites=https://a.example/,A changed;https://b.example/,B changed
//! twilio_account_sid=AC...
//! twilio_auth_token=...
//! twilio_phone_number=+15550001111
//! destination_phone_number=+15550002222
//! ```
//!
//! The result is a [`RawConfigFile`], so it goes through exactly the same
//! validation as the TOML format.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::model::{AlertSection, RawConfigFile, TargetConfig, TwilioSection};
use crate::errors::{Result, SitewatchError};
use crate::types::AlertProvider;

const TWILIO_KEYS: [&str; 4] = [
    "twilio_account_sid",
    "twilio_auth_token",
    "twilio_phone_number",
    "destination_phone_number",
];

/// Parse the flat format into a raw (unvalidated) config.
pub fn parse_legacy(contents: &str) -> Result<RawConfigFile> {
    let mut values: HashMap<String, String> = HashMap::new();

    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // Split on the first '=' only: urls may carry query strings.
        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            SitewatchError::ConfigError(format!(
                "line {}: expected key=value, got '{}'",
                idx + 1,
                trimmed
            ))
        })?;
        values.insert(key.trim().to_string(), value.trim().to_string());
    }

    let mut raw = RawConfigFile::default();

    if let Some(websites) = values.get("websites") {
        raw.target = parse_websites(websites)?;
    }

    raw.alert = parse_alert(&values)?;

    if let Some(v) = values.get("poll_interval") {
        raw.config.poll_interval = v.clone();
    }
    if let Some(v) = values.get("status_interval") {
        raw.config.status_interval = v.clone();
    }
    if let Some(v) = values.get("request_timeout") {
        raw.config.request_timeout = v.clone();
    }
    if let Some(v) = values.get("snapshot_path") {
        raw.config.snapshot_path = Some(PathBuf::from(v));
    }
    if let Some(v) = values.get("autostart") {
        raw.config.autostart = v.parse().map_err(|_| {
            SitewatchError::ConfigError(format!("autostart: expected true or false, got '{v}'"))
        })?;
    }

    Ok(raw)
}

fn parse_websites(value: &str) -> Result<Vec<TargetConfig>> {
    let mut targets = Vec::new();
    for entry in value.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (url, message) = entry.split_once(',').ok_or_else(|| {
            SitewatchError::ConfigError(format!(
                "websites: expected 'url,message', got '{entry}'"
            ))
        })?;
        targets.push(TargetConfig::new(url.trim(), message.trim()));
    }
    Ok(targets)
}

fn parse_alert(values: &HashMap<String, String>) -> Result<AlertSection> {
    let has_twilio = TWILIO_KEYS.iter().all(|k| values.contains_key(*k));

    let provider = match values.get("alert_provider") {
        Some(p) => p.parse::<AlertProvider>().map_err(SitewatchError::ConfigError)?,
        None if has_twilio => AlertProvider::Twilio,
        None => AlertProvider::Log,
    };

    let twilio = has_twilio.then(|| TwilioSection {
        account_sid: values["twilio_account_sid"].clone(),
        auth_token: values["twilio_auth_token"].clone(),
        from: values["twilio_phone_number"].clone(),
        to: values["destination_phone_number"].clone(),
        api_base: values.get("twilio_api_base").cloned(),
    });

    Ok(AlertSection { provider, twilio })
}
