//! HTTP collaborator used by the callback orchestrator
//!
//! The orchestrator never touches `reqwest` directly. It talks to a
//! [`TokenClient`], which can exchange an authorization code and issue
//! bearer-authenticated Web API calls, each yielding a status code and a
//! parsed JSON body. [`ReqwestTokenClient`] is the production
//! implementation; [`FakeTokenClient`](super::fake::FakeTokenClient) is the
//! scripted one used in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SlackConfig;
use crate::error::{Result, SlackIdentityError};

/// Status code and parsed body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when the body was empty.
    pub body: Value,
}

impl ApiResponse {
    /// Shorthand for a response with the given status and body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Abstraction over the HTTP transport and token exchange.
///
/// An `Err` from either method means the call produced no usable response
/// (connection refused, timeout, undecodable body). HTTP error statuses are
/// *not* errors at this layer; they come back as an [`ApiResponse`] so the
/// orchestrator can triage them.
#[async_trait]
pub trait TokenClient: Send + Sync + std::fmt::Debug {
    /// Exchanges an authorization code for a token response.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<ApiResponse>;

    /// Issues a bearer-authenticated `GET` against a Web API method path
    /// such as `/api/auth.test`.
    async fn get(&self, path: &str, access_token: &str, query: &[(&str, &str)])
        -> Result<ApiResponse>;
}

/// [`TokenClient`] backed by a shared [`reqwest::Client`].
///
/// # Examples
///
/// ```
/// use slack_identity::config::SlackConfig;
/// use slack_identity::slack::client::ReqwestTokenClient;
///
/// let client = ReqwestTokenClient::from_config(&SlackConfig::default()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTokenClient {
    http: Arc<reqwest::Client>,
    config: SlackConfig,
}

impl ReqwestTokenClient {
    /// Wraps an existing HTTP client.
    pub fn new(http: Arc<reqwest::Client>, config: SlackConfig) -> Self {
        Self { http, config }
    }

    /// Builds a client whose request timeout is `timeout_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`SlackIdentityError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn from_config(config: &SlackConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(SlackIdentityError::Http)?;
        Ok(Self::new(Arc::new(http), config.clone()))
    }

    async fn into_api_response(resp: reqwest::Response) -> Result<ApiResponse> {
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(SlackIdentityError::Http)?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                SlackIdentityError::Transport(format!(
                    "response body from status {status} is not JSON: {e}"
                ))
            })?
        };

        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl TokenClient for ReqwestTokenClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<ApiResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let url = self.config.endpoint(&self.config.token_path);
        tracing::debug!("Exchanging authorization code at {}", url);

        let resp = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(SlackIdentityError::Http)?;

        Self::into_api_response(resp).await
    }

    async fn get(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let url = self.config.endpoint(path);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(SlackIdentityError::Http)?;

        Self::into_api_response(resp).await
    }
}
