// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of the controller API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{ParseError, ProtocolError, Result};
use crate::protocol::{DoorApi, HistoryEndpoint};
use crate::types::HistoryEntry;

// ============================================================================
// HttpConfig - Connection parameters for a controller
// ============================================================================

/// Configuration for reaching a garage envoy controller over HTTP.
///
/// # Examples
///
/// ```
/// use garage_envoy::protocol::{HistoryEndpoint, HttpConfig};
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = HttpConfig::new("192.168.1.20");
///
/// // With all options
/// let config = HttpConfig::new("garage.local")
///     .with_port(8080)
///     .with_https()
///     .with_endpoint(HistoryEndpoint::legacy_events())
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "https://garage.local:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    use_https: bool,
    timeout: Option<Duration>,
    endpoint: HistoryEndpoint,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;

    /// Creates a new HTTP configuration for the specified host.
    ///
    /// Requests have no timeout unless [`with_timeout`](Self::with_timeout)
    /// is used; a hung request only delays the next poll.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            timeout: None,
            endpoint: HistoryEndpoint::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    ///
    /// If port hasn't been explicitly set, it will be changed to 443.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        if self.port == Self::DEFAULT_PORT {
            self.port = Self::DEFAULT_HTTPS_PORT;
        }
        self
    }

    /// Sets a request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Selects which history endpoint to poll.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: HistoryEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether HTTPS is enabled.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the history endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &HistoryEndpoint {
        &self.endpoint
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn into_client(self) -> std::result::Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }
        let base_url = self.base_url();
        HttpClient::with_parts(base_url, self.timeout, self.endpoint)
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for a garage envoy controller.
///
/// # Examples
///
/// ```no_run
/// use garage_envoy::protocol::{DoorApi, HttpClient};
///
/// # async fn example() -> garage_envoy::Result<()> {
/// let client = HttpClient::new("192.168.1.20")?;
/// let history = client.fetch_history(20).await?;
/// if let Some(last) = history.last() {
///     println!("door is {:?}", last.name());
/// }
/// client.trigger().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    endpoint: HistoryEndpoint,
}

/// Body of a history response; which list is present depends on the endpoint.
#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    events: Option<Vec<HistoryEntry>>,
}

impl HttpClient {
    /// Creates a client for the given host or base URL.
    ///
    /// A bare host gets an `http://` scheme. The modern `/history`
    /// endpoint is used and requests have no timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> std::result::Result<Self, ProtocolError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("http://{host}")
        };
        Self::with_parts(base_url, None, HistoryEndpoint::default())
    }

    fn with_parts(
        base_url: String,
        timeout: Option<Duration>,
        endpoint: HistoryEndpoint,
    ) -> std::result::Result<Self, ProtocolError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            endpoint,
        })
    }

    /// Switches to a different history endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: HistoryEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Returns the base URL of the controller.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the history endpoint in use.
    #[must_use]
    pub fn endpoint(&self) -> &HistoryEndpoint {
        &self.endpoint
    }

    /// Builds the URL for a history query.
    fn history_url(&self, limit: usize) -> String {
        match &self.endpoint {
            HistoryEndpoint::History => format!("{}/history?n={limit}", self.base_url),
            HistoryEndpoint::Events { event_type } => format!(
                "{}/events?t={}&n={limit}",
                self.base_url,
                urlencoding::encode(event_type)
            ),
        }
    }

    fn trigger_url(&self) -> String {
        format!("{}/_trigger", self.base_url)
    }

    fn check_status(response: &reqwest::Response) -> std::result::Result<(), ProtocolError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(ProtocolError::Status {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }

    /// Decodes a history body, keeping at most `limit` of the newest entries.
    fn decode_history(&self, body: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let envelope: HistoryEnvelope = serde_json::from_str(body).map_err(ParseError::Json)?;
        let (entries, field) = match self.endpoint {
            HistoryEndpoint::History => (envelope.history, "history"),
            HistoryEndpoint::Events { .. } => (envelope.events, "events"),
        };
        let mut entries = entries.ok_or_else(|| ParseError::MissingField(field.to_string()))?;
        if entries.len() > limit {
            entries.drain(..entries.len() - limit);
        }
        Ok(entries)
    }
}

impl DoorApi for HttpClient {
    async fn fetch_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let url = self.history_url(limit);

        tracing::debug!(url = %url, "Fetching door history");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        Self::check_status(&response)?;

        let body = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(body = %body, "Received history response");

        self.decode_history(&body, limit)
    }

    async fn trigger(&self) -> Result<()> {
        let url = self.trigger_url();

        tracing::debug!(url = %url, "Sending door trigger");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        Self::check_status(&response)?;
        Ok(())
    }
}
