//! Single-shot JSON fetches over an abortable HTTP session.
//!
//! One GET, one outcome: no retries, no extra timeout unless the session was
//! built with one. Aborting a session fails every request in flight on it.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Identifying `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("clockweather/", env!("CARGO_PKG_VERSION"));

/// Fetch failures, each kept distinct for logging
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error {0}")]
    Status(u16),

    #[error("Empty response")]
    EmptyBody,

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request aborted")]
    Aborted,
}

impl FetchError {
    /// Returns a short message suitable for an inline status row.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Status(status) if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            FetchError::Status(_) => "The request failed. Please try again.",
            FetchError::EmptyBody | FetchError::Parse(_) => {
                "Received an unexpected response. Please try again."
            }
            FetchError::Transport(e) if e.is_timeout() => {
                "The request timed out. Please try again."
            }
            FetchError::Transport(_) => "Unable to connect. Check your internet connection.",
            FetchError::Aborted => "The request was cancelled.",
        }
    }
}

/// Abortable HTTP session.
///
/// Wraps a `reqwest::Client` together with an abort token. Dropping the
/// session aborts it.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    abort: CancellationToken,
}

impl HttpSession {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(None)
    }

    /// Build a session; `None` keeps the transport's default timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, FetchError> {
        Self::with_options(USER_AGENT, timeout)
    }

    /// Build a session identifying as `user_agent`.
    pub fn with_options(user_agent: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            abort: CancellationToken::new(),
        })
    }

    /// Abort every request in flight and refuse new ones.
    pub fn abort(&self) {
        if !self.abort.is_cancelled() {
            tracing::debug!("Aborting HTTP session");
            self.abort.cancel();
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// GET `url` and parse the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        fetch_json(self, url).await
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        self.abort.cancel();
    }
}

/// Issue one GET on `session` and decode the JSON body.
#[instrument(skip(session), level = "debug")]
pub async fn fetch_json<T: DeserializeOwned>(
    session: &HttpSession,
    url: &str,
) -> Result<T, FetchError> {
    if session.is_aborted() {
        return Err(FetchError::Aborted);
    }

    let request = async {
        let response = session
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        Ok(serde_json::from_slice(&body)?)
    };

    tokio::select! {
        biased;
        _ = session.abort.cancelled() => Err(FetchError::Aborted),
        result = request => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_identifies_crate() {
        assert!(USER_AGENT.starts_with("clockweather/"));
    }

    #[test]
    fn test_user_messages() {
        assert!(FetchError::Status(503).user_message().contains("server"));
        assert!(FetchError::Status(404).user_message().contains("failed"));
        assert!(FetchError::EmptyBody.user_message().contains("unexpected"));
        assert!(FetchError::Aborted.user_message().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_aborted_session_refuses_requests() {
        let session = HttpSession::new().unwrap();
        session.abort();
        assert!(session.is_aborted());

        let result: Result<serde_json::Value, _> =
            session.get_json("http://127.0.0.1:9/never-called").await;
        assert!(matches!(result, Err(FetchError::Aborted)));
    }
}
