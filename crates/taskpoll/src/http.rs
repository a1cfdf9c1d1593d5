//! HTTP collaborators (feature `http`).
//!
//! [`HttpTextSource`] fetches a progress page; [`HttpTrigger`] requests a
//! refresh URL between observations. Both use a blocking client, matching the
//! blocking sleep of the poller.

use crate::marker::TextSource;
use crate::result::{PollError, TaskpollResult};
use crate::trigger::OperationTrigger;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout used by [`HttpTextSource::new`] and [`HttpTrigger::new`]
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request method used by [`HttpTrigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// Plain GET of the refresh URL
    #[default]
    Get,
    /// Empty-body POST, as submitted by a refresh form
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

fn build_client() -> TaskpollResult<Client> {
    Ok(Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?)
}

fn check_status(response: Response, url: &str) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(format!("{url} returned HTTP {}", status.as_u16()))
    }
}

// =============================================================================
// TEXT SOURCE
// =============================================================================

/// GETs a page on every fetch
#[derive(Debug, Clone)]
pub struct HttpTextSource {
    url: String,
    client: Client,
}

impl HttpTextSource {
    /// Observe `url` with a default client
    pub fn new(url: impl Into<String>) -> TaskpollResult<Self> {
        Ok(Self::with_client(url, build_client()?))
    }

    /// Observe `url` with a caller-supplied client (cookies, auth, timeouts)
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// The observed URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TextSource for HttpTextSource {
    fn fetch(&mut self) -> TaskpollResult<String> {
        debug!(url = %self.url, "fetching page");
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| PollError::observation(err.to_string()))?;
        let response = check_status(response, &self.url).map_err(PollError::observation)?;
        response
            .text()
            .map_err(|err| PollError::observation(err.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// =============================================================================
// TRIGGER
// =============================================================================

/// Requests a refresh URL on every advance
#[derive(Debug, Clone)]
pub struct HttpTrigger {
    url: String,
    method: HttpMethod,
    client: Client,
}

impl HttpTrigger {
    /// Refresh via `method` on `url` with a default client
    pub fn new(url: impl Into<String>, method: HttpMethod) -> TaskpollResult<Self> {
        Ok(Self::with_client(url, method, build_client()?))
    }

    /// Refresh with a caller-supplied client
    pub fn with_client(url: impl Into<String>, method: HttpMethod, client: Client) -> Self {
        Self {
            url: url.into(),
            method,
            client,
        }
    }

    /// The refresh URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The request method
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }
}

impl OperationTrigger for HttpTrigger {
    fn advance(&mut self) -> TaskpollResult<()> {
        debug!(url = %self.url, method = %self.method, "requesting refresh");
        let request = match self.method {
            HttpMethod::Get => self.client.get(&self.url),
            HttpMethod::Post => self.client.post(&self.url),
        };
        let response = request
            .send()
            .map_err(|err| PollError::trigger(err.to_string()))?;
        check_status(response, &self.url).map_err(PollError::trigger)?;
        Ok(())
    }
}
