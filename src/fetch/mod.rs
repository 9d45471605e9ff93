// src/fetch/mod.rs

//! Page fetching and fingerprinting.
//!
//! A [`Fetcher`] turns a url into a [`Fingerprint`] of the page's
//! normalized content. It has no side effects; the poll cycle decides what
//! to do with the result.
//!
//! - [`http`] holds the production `reqwest` implementation.
//! - [`normalize`] reduces a response body to a representation that is
//!   stable under formatting noise.

pub mod http;
pub mod normalize;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::types::Fingerprint;

pub use http::ReqwestFetcher;
pub use normalize::{normalize_body, normalize_html, normalize_text};

/// Boxed future returned by [`Fetcher::fetch`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Fingerprint, FetchError>> + Send + 'a>>;

/// Trait abstracting how a page is retrieved and fingerprinted.
///
/// Production code uses [`ReqwestFetcher`]; tests can provide scripted
/// implementations that never touch the network.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            user_agent: concat!("sitewatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    TooLarge { max_bytes: u64 },
    ParseFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Everything except a body we could not interpret counts as a
    /// network-level failure.
    pub fn is_network(&self) -> bool {
        !matches!(self.kind, FailureKind::ParseFailure)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FailureKind::InvalidUrl => write!(f, "invalid url: {}", self.message),
            FailureKind::Network => write!(f, "network error: {}", self.message),
            FailureKind::Timeout => write!(f, "timed out: {}", self.message),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}: {}", self.message),
            FailureKind::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            FailureKind::ParseFailure => write!(f, "unreadable body: {}", self.message),
        }
    }
}

impl std::error::Error for FetchError {}
