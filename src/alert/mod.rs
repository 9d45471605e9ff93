// src/alert/mod.rs

//! Change-notification destinations.
//!
//! The poll cycle hands the target's alert message to an [`AlertSink`] when
//! a change is detected. Delivery failures are reported back as
//! [`AlertError`] and only ever logged by the caller.

pub mod log;
pub mod twilio;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::config::AlertConfig;

pub use log::LogAlertSink;
pub use twilio::TwilioAlertSink;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    #[error("alert delivery failed: {0}")]
    DeliveryFailed(String),
    #[error("alert channel unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`AlertSink::send`].
pub type AlertFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AlertError>> + Send + 'a>>;

/// Trait abstracting where change notifications go.
pub trait AlertSink: Send + Sync {
    fn send<'a>(&'a self, message: &'a str) -> AlertFuture<'a>;
}

/// Build the sink selected by configuration.
pub fn build_sink(config: &AlertConfig) -> Result<Arc<dyn AlertSink>, AlertError> {
    match config {
        AlertConfig::Log => Ok(Arc::new(LogAlertSink::new())),
        AlertConfig::Twilio(creds) => Ok(Arc::new(TwilioAlertSink::new(creds.clone())?)),
    }
}
