// src/alert/log.rs

use chrono::Local;
use tracing::warn;

use crate::alert::{AlertFuture, AlertSink};

/// Prints alerts on stdout and logs them. Never fails.
#[derive(Debug, Clone, Default)]
pub struct LogAlertSink;

impl LogAlertSink {
    pub fn new() -> Self {
        Self
    }
}

impl AlertSink for LogAlertSink {
    fn send<'a>(&'a self, message: &'a str) -> AlertFuture<'a> {
        Box::pin(async move {
            let now = Local::now().format("%Y-%m-%d %H:%M:%S");
            println!("\n{now} - ALERT: {message}");
            warn!(message = %message, "alert raised");
            Ok(())
        })
    }
}
