//! Transport settings and construction of the underlying reqwest client.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Total timeout for a request, including reading the body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Idle connections kept open per host.
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 8;

/// Idle connections kept open across all hosts.
pub const DEFAULT_MAX_IDLE: usize = 16;

pub const DEFAULT_USER_AGENT: &str = concat!("restlib/", env!("CARGO_PKG_VERSION"));

/// Transport settings for a [`RestClient`](super::RestClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_idle_per_host: usize,
    /// Idle connections kept across all hosts.
    /// reqwest only limits idle connections per host, so this caps the per-host value.
    pub max_idle: usize,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            max_idle: DEFAULT_MAX_IDLE,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
        }
    }
}

impl ClientConfig {
    /// Sets the TCP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the total timeout for a request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the idle connection limit per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Sets the idle connection limit across all hosts.
    pub fn with_max_idle(mut self, max: usize) -> Self {
        self.max_idle = max;
        self
    }

    /// Sets the user agent, or sends none when `None`.
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Idle connection limit handed to the transport for each host.
    pub fn effective_idle_per_host(&self) -> usize {
        self.max_idle_per_host.min(self.max_idle)
    }

    /// Builds the underlying reqwest client.
    pub fn build_client(&self) -> Result<Client> {
        debug!(
            "Building HTTP client: connect_timeout={:?}, timeout={:?}, idle_per_host={}",
            self.connect_timeout,
            self.request_timeout,
            self.effective_idle_per_host()
        );

        let mut builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .pool_max_idle_per_host(self.effective_idle_per_host());

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        builder.build().context("Failed to build HTTP client")
    }
}
