//! Slack "Sign in with Slack" strategy
//!
//! # Module Layout
//!
//! - [`authorize`] -- authorize redirect URL construction
//! - [`callback`]  -- code exchange, token verification and profile fetch
//! - [`identity`]  -- projection of a finished callback into normalized records
//! - [`types`]     -- Slack wire records
//! - [`client`]    -- HTTP collaborator trait and its `reqwest` implementation
//! - [`fake`]      -- scripted collaborator for tests

pub mod authorize;
pub mod callback;
pub mod client;
pub mod fake;
pub mod identity;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::SlackConfig;
use crate::error::{Result, SlackIdentityError};
use crate::strategy::{Credentials, Extra, Info, Strategy};

use authorize::{AuthorizeRequest, AuthorizeUrlBuilder};
use callback::{CallbackOrchestrator, CallbackRequest, CallbackState};
use client::{ReqwestTokenClient, TokenClient};

/// [`Strategy`] implementation for Slack.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use slack_identity::config::SlackConfig;
/// use slack_identity::slack::SlackStrategy;
/// use slack_identity::slack::authorize::AuthorizeRequest;
/// use slack_identity::slack::fake::FakeTokenClient;
/// use slack_identity::strategy::Strategy;
///
/// let config = SlackConfig { client_id: "client-1".to_string(), ..Default::default() };
/// let strategy = SlackStrategy::new(&config, Arc::new(FakeTokenClient::new())).unwrap();
///
/// let url = strategy.build_authorize_url(&AuthorizeRequest::default());
/// assert!(url.starts_with("https://slack.com/oauth/authorize?"));
/// ```
#[derive(Debug, Clone)]
pub struct SlackStrategy {
    authorize: AuthorizeUrlBuilder,
    orchestrator: CallbackOrchestrator,
    uid_field: String,
}

impl SlackStrategy {
    /// Provider name used as the registry key.
    pub const NAME: &'static str = "slack";

    /// Creates a strategy that talks to Slack through `client`.
    ///
    /// # Errors
    ///
    /// Returns [`SlackIdentityError::Config`] if the authorize endpoint
    /// derived from `site` is not a valid URL.
    pub fn new(config: &SlackConfig, client: Arc<dyn TokenClient>) -> Result<Self> {
        let endpoint = config.endpoint(&config.authorize_path);
        let authorize_endpoint = Url::parse(&endpoint).map_err(|e| {
            SlackIdentityError::Config(format!("Invalid authorize endpoint {}: {}", endpoint, e))
        })?;

        let authorize = AuthorizeUrlBuilder::new(
            authorize_endpoint,
            config.client_id.clone(),
            config.default_scope.clone(),
            &config.callback_url,
        );
        let orchestrator = CallbackOrchestrator::new(client, authorize.redirect_uri());

        Ok(Self {
            authorize,
            orchestrator,
            uid_field: config.uid_field.clone(),
        })
    }

    /// Creates a strategy backed by [`ReqwestTokenClient`].
    pub fn from_config(config: &SlackConfig) -> Result<Self> {
        let client = ReqwestTokenClient::from_config(config)?;
        Self::new(config, Arc::new(client))
    }
}

#[async_trait]
impl Strategy for SlackStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build_authorize_url(&self, request: &AuthorizeRequest) -> String {
        self.authorize.build(request)
    }

    async fn handle_callback(&self, request: &CallbackRequest) -> CallbackState {
        self.orchestrator.run(request).await
    }

    fn uid(&self, state: &CallbackState) -> Option<String> {
        identity::uid(state, &self.uid_field)
    }

    fn credentials(&self, state: &CallbackState) -> Option<Credentials> {
        identity::credentials(state)
    }

    fn info(&self, state: &CallbackState, seed: Info) -> Info {
        identity::info(state, seed)
    }

    fn extra(&self, state: &CallbackState) -> Extra {
        identity::extra(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::fake::FakeTokenClient;

    #[test]
    fn test_new_rejects_invalid_site() {
        let config = SlackConfig {
            site: "::not a url::".to_string(),
            ..Default::default()
        };
        assert!(SlackStrategy::new(&config, Arc::new(FakeTokenClient::new())).is_err());
    }

    #[test]
    fn test_authorize_url_uses_configured_site() {
        let config = SlackConfig {
            client_id: "client-1".to_string(),
            site: "http://127.0.0.1:9000/".to_string(),
            callback_url: "http://localhost/cb?".to_string(),
            ..Default::default()
        };
        let strategy = SlackStrategy::new(&config, Arc::new(FakeTokenClient::new())).unwrap();
        let url = strategy.build_authorize_url(&AuthorizeRequest::default());

        assert!(url.starts_with("http://127.0.0.1:9000/oauth/authorize?"));
        assert!(url.ends_with("redirect_uri=http%3A%2F%2Flocalhost%2Fcb"));
    }

    #[tokio::test]
    async fn test_auth_hash_of_failed_callback_carries_errors() {
        let config = SlackConfig::default();
        let strategy = SlackStrategy::new(&config, Arc::new(FakeTokenClient::new())).unwrap();

        let state = strategy.handle_callback(&CallbackRequest::default()).await;
        let err = strategy.auth_hash(&state).unwrap_err();

        match err.downcast_ref::<SlackIdentityError>() {
            Some(SlackIdentityError::Callback(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].kind(), "missing_code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
