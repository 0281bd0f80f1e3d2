//! Probe client.
//!
//! A probe is exactly one outbound request. There are no retries here; the
//! resolver decides how many probes a target gets.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::error::CheckError;
use crate::target::{DEFAULT_TIMEOUT, Target};

/// User agent sent by [`HttpProber`] unless configured otherwise
pub const DEFAULT_USER_AGENT: &str = concat!("uppe-uptime/", env!("CARGO_PKG_VERSION"));

/// Bytes of response body kept per probe; anything past this is not read
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Raw outcome of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ProbeResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Issues a single request against a target
#[async_trait]
pub trait Prober: Send + Sync {
    /// Send one request and return its status and body.
    ///
    /// Fails with [`CheckError::InvalidTarget`] before any I/O when the target
    /// cannot be turned into a request, and with [`CheckError::Transport`]
    /// when the request does not complete.
    async fn probe(&self, target: &Target) -> Result<ProbeResponse, CheckError>;
}

/// HTTP/HTTPS prober backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    body_limit: usize,
}

impl HttpProber {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self { client, body_limit: DEFAULT_BODY_LIMIT })
    }

    /// Cap how much of each response body is read
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> Result<ProbeResponse, CheckError> {
        let (url, method) = target.validate()?;
        let headers = build_headers(target)?;

        let timeout = if target.timeout.is_zero() { DEFAULT_TIMEOUT } else { target.timeout };

        let mut response = self
            .client
            .request(method, url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(target, timeout, e))?;

        let status = response.status().as_u16();
        let mut body = Vec::new();

        while let Some(chunk) =
            response.chunk().await.map_err(|e| transport_error(target, timeout, e))?
        {
            let remaining = self.body_limit - body.len();
            if chunk.len() > remaining {
                body.extend_from_slice(&chunk[..remaining]);
                debug!(url = %target.url, limit = self.body_limit, "Response body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(ProbeResponse { status, body })
    }
}

/// Convert the target's header map, rejecting anything that is not a valid header
fn build_headers(target: &Target) -> Result<HeaderMap, CheckError> {
    let mut headers = HeaderMap::with_capacity(target.headers.len());

    for (key, value) in &target.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
            CheckError::invalid_target(&target.url, format!("invalid header name: {key}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            CheckError::invalid_target(&target.url, format!("invalid value for header {key}"))
        })?;
        headers.append(name, value);
    }

    Ok(headers)
}

/// The cause is logged here and dropped; only "no sample" travels on
fn transport_error(target: &Target, timeout: Duration, error: reqwest::Error) -> CheckError {
    debug!(
        url = %target.url,
        timed_out = error.is_timeout(),
        timeout_ms = timeout.as_millis() as u64,
        "Probe request failed: {}",
        error
    );
    CheckError::Transport { url: target.url.clone() }
}
