//! In-process fake token client for unit and integration tests
//!
//! [`FakeTokenClient`] replaces real network I/O with scripted replies and
//! records every call it receives, so tests can assert both on the outcome
//! of a callback and on which collaborator calls were (or were not) made.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use slack_identity::slack::client::{ApiResponse, TokenClient};
//! use slack_identity::slack::fake::FakeTokenClient;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = FakeTokenClient::new()
//!     .with_response("/api/auth.test", ApiResponse::new(200, json!({"ok": true})));
//!
//! let resp = client.get("/api/auth.test", "tok", &[]).await.unwrap();
//! assert_eq!(resp.status, 200);
//! assert_eq!(client.call_count("/api/auth.test").await, 1);
//! # }
//! ```

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::error::{Result, SlackIdentityError};
use crate::slack::client::{ApiResponse, TokenClient};

/// Path under which token exchange calls are recorded.
pub const EXCHANGE_PATH: &str = "oauth.exchange";

/// One call observed by a [`FakeTokenClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// API path, or [`EXCHANGE_PATH`] for token exchanges
    pub path: String,
    /// Access token for API calls, authorization code for exchanges
    pub credential: String,
    /// Query parameters for API calls, `redirect_uri` for exchanges
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Reply {
    Response(ApiResponse),
    Failure(String),
}

/// Scripted [`TokenClient`] for tests.
///
/// Replies are keyed by path and reused for every call to that path. A call
/// to a path with no script fails as a transport error.
#[derive(Debug, Default)]
pub struct FakeTokenClient {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTokenClient {
    /// Creates a fake with no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the token exchange reply.
    pub fn with_exchange(self, response: ApiResponse) -> Self {
        self.with_response(EXCHANGE_PATH, response)
    }

    /// Scripts the token exchange to fail at the transport level.
    pub fn with_exchange_failure(self, reason: impl Into<String>) -> Self {
        self.with_failure(EXCHANGE_PATH, reason)
    }

    /// Scripts the reply for `path`.
    pub fn with_response(mut self, path: impl Into<String>, response: ApiResponse) -> Self {
        self.replies.insert(path.into(), Reply::Response(response));
        self
    }

    /// Scripts `path` to fail at the transport level with `reason`.
    pub fn with_failure(mut self, path: impl Into<String>, reason: impl Into<String>) -> Self {
        self.replies.insert(path.into(), Reply::Failure(reason.into()));
        self
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of calls received for `path`.
    pub async fn call_count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.path == path)
            .count()
    }

    async fn reply(&self, call: RecordedCall) -> Result<ApiResponse> {
        let path = call.path.clone();
        self.calls.lock().await.push(call);

        match self.replies.get(&path) {
            Some(Reply::Response(response)) => Ok(response.clone()),
            Some(Reply::Failure(reason)) => {
                Err(SlackIdentityError::Transport(reason.clone()).into())
            }
            None => {
                Err(SlackIdentityError::Transport(format!("no scripted reply for {path}")).into())
            }
        }
    }
}

#[async_trait::async_trait]
impl TokenClient for FakeTokenClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<ApiResponse> {
        self.reply(RecordedCall {
            path: EXCHANGE_PATH.to_string(),
            credential: code.to_string(),
            params: vec![("redirect_uri".to_string(), redirect_uri.to_string())],
        })
        .await
    }

    async fn get(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.reply(RecordedCall {
            path: path.to_string(),
            credential: access_token.to_string(),
            params: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_exchange_calls() {
        let client = FakeTokenClient::new()
            .with_exchange(ApiResponse::new(200, json!({"access_token": "tok"})));

        client
            .exchange_code("abc", "http://localhost/callback")
            .await
            .unwrap();

        let calls = client.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, EXCHANGE_PATH);
        assert_eq!(calls[0].credential, "abc");
    }

    #[tokio::test]
    async fn test_unscripted_path_fails_and_is_still_recorded() {
        let client = FakeTokenClient::new();
        let err = client.get("/api/users.identity", "tok", &[]).await.unwrap_err();
        assert!(err.to_string().contains("no scripted reply"));
        assert_eq!(client.call_count("/api/users.identity").await, 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let client = FakeTokenClient::new().with_failure("/api/auth.test", "connection refused");
        let err = client.get("/api/auth.test", "tok", &[]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SlackIdentityError>(),
            Some(SlackIdentityError::Transport(reason)) if reason == "connection refused"
        ));
    }
}
