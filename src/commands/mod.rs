//! Command handlers for the slack-identity binary
//!
//! Each handler takes an already-populated [`StrategyRegistry`] so it can be
//! exercised with a scripted token client in tests.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, SlackIdentityError};
use crate::slack::authorize::{generate_state, AuthorizeRequest};
use crate::slack::callback::CallbackRequest;
use crate::slack::SlackStrategy;
use crate::strategy::StrategyRegistry;

/// Builds a registry holding the live Slack strategy described by `config`.
pub fn build_registry(config: &Config) -> Result<StrategyRegistry> {
    let mut registry = StrategyRegistry::new();
    registry.register(Arc::new(SlackStrategy::from_config(&config.slack)?));
    Ok(registry)
}

/// Returns the authorize URL, generating a state nonce when none is given.
pub fn authorize_url(
    registry: &StrategyRegistry,
    scope: Option<String>,
    state: Option<String>,
    team: Option<String>,
) -> Result<String> {
    let request = AuthorizeRequest {
        scope,
        state: Some(state.unwrap_or_else(generate_state)),
        team,
    };
    registry.authorize_url(SlackStrategy::NAME, &request)
}

/// Runs the callback and returns the assembled identity as pretty JSON.
///
/// # Errors
///
/// Returns [`SlackIdentityError::Callback`](crate::error::SlackIdentityError::Callback)
/// when the callback failed.
pub async fn callback(registry: &StrategyRegistry, request: CallbackRequest) -> Result<String> {
    let auth_hash = registry.callback(SlackStrategy::NAME, &request).await?;
    tracing::info!(
        "Authenticated {} user {}",
        auth_hash.provider,
        auth_hash.uid.as_deref().unwrap_or("<no uid>")
    );
    let output =
        serde_json::to_string_pretty(&auth_hash).map_err(SlackIdentityError::Serialization)?;
    Ok(output)
}
