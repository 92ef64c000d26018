use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use tracing::debug;

const USER_AGENT: &str = concat!("skybridge/", env!("CARGO_PKG_VERSION"));

/// Blocking transport for the emulator control server.
///
/// Every control operation is a single GET with query parameters. A
/// connection failure or a non-2xx status surfaces here as an error;
/// response-body interpretation is left to the caller.
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }

    /// Base URL of the control server, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/{endpoint}` with the given query parameters.
    ///
    /// Parameters are passed as pairs so that repeated keys (e.g. one
    /// `addr` per memory address) are transmitted verbatim.
    pub fn get(&self, endpoint: &str, params: &[(String, String)]) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {url} ({} params)", params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        response
            .error_for_status()
            .with_context(|| format!("request to {url} returned an error status"))
    }
}
