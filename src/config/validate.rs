// src/config/validate.rs

use std::collections::HashSet;
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    AlertConfig, AlertSection, ConfigFile, ConfigSection, RawConfigFile, Settings,
    TargetConfig, TwilioCredentials, TWILIO_API_BASE,
};
use crate::errors::{Result, SitewatchError};
use crate::types::AlertProvider;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SitewatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let settings = validate_settings(&raw.config)?;
        let alert = validate_alert(&raw.alert)?;
        validate_targets(&raw.target)?;
        Ok(ConfigFile::new_unchecked(settings, alert, raw.target))
    }
}

/// Check that `url` is something the fetcher can request.
///
/// Shared with the console `add` command.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|err| SitewatchError::InvalidUrl(format!("'{url}': {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SitewatchError::InvalidUrl(format!(
            "'{url}': unsupported scheme '{other}' (expected http or https)"
        ))),
    }
}

fn validate_settings(cfg: &ConfigSection) -> Result<Settings> {
    if cfg.max_body_bytes == 0 {
        return Err(SitewatchError::ConfigError(
            "[config].max_body_bytes must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(Settings {
        poll_interval: non_zero_duration("poll_interval", &cfg.poll_interval)?,
        status_interval: non_zero_duration("status_interval", &cfg.status_interval)?,
        request_timeout: non_zero_duration("request_timeout", &cfg.request_timeout)?,
        connect_timeout: non_zero_duration("connect_timeout", &cfg.connect_timeout)?,
        max_body_bytes: cfg.max_body_bytes,
        snapshot_path: cfg.snapshot_path.clone(),
        autostart: cfg.autostart,
    })
}

fn non_zero_duration(key: &str, value: &str) -> Result<Duration> {
    let dur = parse_duration(value)
        .map_err(|e| SitewatchError::ConfigError(format!("[config].{key}: {e}")))?;
    if dur.is_zero() {
        return Err(SitewatchError::ConfigError(format!(
            "[config].{key} must be greater than zero"
        )));
    }
    Ok(dur)
}

fn validate_alert(section: &AlertSection) -> Result<AlertConfig> {
    match section.provider {
        AlertProvider::Log => Ok(AlertConfig::Log),
        AlertProvider::Twilio => {
            let twilio = section.twilio.as_ref().ok_or_else(|| {
                SitewatchError::ConfigError(
                    "provider = \"twilio\" requires an [alert.twilio] section".to_string(),
                )
            })?;

            let fields = [
                ("account_sid", &twilio.account_sid),
                ("auth_token", &twilio.auth_token),
                ("from", &twilio.from),
                ("to", &twilio.to),
            ];
            for (name, value) in fields {
                if value.trim().is_empty() {
                    return Err(SitewatchError::ConfigError(format!(
                        "[alert.twilio].{name} must not be empty"
                    )));
                }
            }

            Ok(AlertConfig::Twilio(TwilioCredentials {
                account_sid: twilio.account_sid.trim().to_string(),
                auth_token: twilio.auth_token.trim().to_string(),
                from: twilio.from.trim().to_string(),
                to: twilio.to.trim().to_string(),
                api_base: twilio
                    .api_base
                    .as_deref()
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| TWILIO_API_BASE.to_string()),
            }))
        }
    }
}

fn validate_targets(targets: &[TargetConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for target in targets {
        validate_url(&target.url).map_err(|e| SitewatchError::ConfigError(e.to_string()))?;
        if !seen.insert(target.url.as_str()) {
            return Err(SitewatchError::ConfigError(format!(
                "target '{}' is listed more than once",
                target.url
            )));
        }
    }
    Ok(())
}
