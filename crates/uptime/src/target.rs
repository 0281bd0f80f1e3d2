//! Target definitions.
//!
//! A [`Target`] is everything needed to probe one endpoint and judge the
//! response: where to send the request, how to send it, and what a healthy
//! answer looks like.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::error::CheckError;

/// Default response timeout for a probe
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Inclusive range of status codes considered healthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusRange {
    pub min: u16,
    pub max: u16,
}

impl StatusRange {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, status: u16) -> bool {
        (self.min..=self.max).contains(&status)
    }
}

impl Default for StatusRange {
    fn default() -> Self {
        Self::new(200, 299)
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// A monitored endpoint with its request and health-policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Display label, defaults to the URL
    pub name: String,

    /// The URL to probe
    pub url: String,

    /// HTTP method token (GET, POST, ...)
    pub method: String,

    /// Request headers, applied verbatim
    pub headers: BTreeMap<String, String>,

    /// Healthy status codes
    pub healthy_status: StatusRange,

    /// Substring the extracted content must contain, if any
    pub healthy_content: Option<String>,

    /// Bound on each probe, including reading the body
    pub timeout: Duration,
}

impl Target {
    /// Create a GET target with the default health policy
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            url,
            method: Method::GET.to_string(),
            headers: BTreeMap::new(),
            healthy_status: StatusRange::default(),
            healthy_content: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_status_range(mut self, min: u16, max: u16) -> Self {
        self.healthy_status = StatusRange::new(min, max);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.healthy_content = Some(content.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The content rule, or `None` when content is not a criterion.
    ///
    /// An empty string is the same as no rule.
    pub fn content_rule(&self) -> Option<&str> {
        self.healthy_content.as_deref().filter(|content| !content.is_empty())
    }

    /// Parse the URL, accepting only absolute http(s) URLs
    pub fn parsed_url(&self) -> Result<Url, CheckError> {
        let parsed = Url::parse(&self.url).map_err(|e| CheckError::invalid_target(&self.url, e))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(CheckError::invalid_target(
                &self.url,
                format!("unsupported URL scheme: {other}"),
            )),
        }
    }

    /// Parse the method token
    pub fn parsed_method(&self) -> Result<Method, CheckError> {
        Method::from_bytes(self.method.to_uppercase().as_bytes()).map_err(|_| {
            CheckError::invalid_target(&self.url, format!("invalid HTTP method: {}", self.method))
        })
    }

    /// Check every static invariant of the target without touching the network,
    /// returning the parsed URL and method
    pub fn validate(&self) -> Result<(Url, Method), CheckError> {
        let url = self.parsed_url()?;
        let method = self.parsed_method()?;

        if self.healthy_status.min > self.healthy_status.max {
            return Err(CheckError::invalid_target(
                &self.url,
                format!("healthy status range {} is empty", self.healthy_status),
            ));
        }

        Ok((url, method))
    }
}
