//! Error taxonomy for health checks.
//!
//! Every failure that can happen while checking a target is a [`CheckError`].
//! None of them are fatal: the resolver turns them into unhealthy or absent
//! samples and keeps going.

use serde::Serialize;
use thiserror::Error;

/// A classified failure of a single probe or evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckError {
    /// The target cannot be probed as configured. No request was sent.
    #[error("invalid target {url}: {reason}")]
    InvalidTarget { url: String, reason: String },

    /// The request could not be completed (DNS, connect, TLS, timeout, body read).
    #[error("there was an error making the HTTP request to {url}")]
    Transport { url: String },

    /// The response status fell outside the healthy range.
    #[error("the response has an unhealthy status code of {status} (expected {min}..={max})")]
    StatusMismatch { status: u16, min: u16, max: u16 },

    /// The extracted content did not contain the expected substring.
    #[error("the response did not contain {expected:?}")]
    ContentMismatch { expected: String },
}

impl CheckError {
    pub(crate) fn invalid_target(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidTarget { url: url.into(), reason: reason.to_string() }
    }

    /// True when the error means no sample was obtained for the slot.
    pub fn is_absent_sample(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. } | Self::Transport { .. })
    }
}
