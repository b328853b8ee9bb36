//! Provider-neutral strategy contract
//!
//! A pipeline that supports several identity providers holds a
//! [`StrategyRegistry`] mapping provider names to [`Strategy`]
//! implementations and drives every login through the same two hops:
//!
//! 1. [`StrategyRegistry::authorize_url`] on the initial request.
//! 2. [`StrategyRegistry::callback`] on the provider's redirect back, which
//!    runs the strategy's callback and assembles an [`AuthHash`].

pub mod auth_hash;

pub use auth_hash::{AuthHash, Credentials, Extra, Info};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, SlackIdentityError};
use crate::slack::authorize::AuthorizeRequest;
use crate::slack::callback::{CallbackRequest, CallbackState};

/// Contract every identity provider strategy fulfils.
///
/// The assembly methods are pure projections over a finished
/// [`CallbackState`] and may be called repeatedly.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Registry key, e.g. `"slack"`.
    fn name(&self) -> &str;

    /// URL the browser is redirected to on the initial hop.
    fn build_authorize_url(&self, request: &AuthorizeRequest) -> String;

    /// Runs the callback for `request`. Failures are attached to the state.
    async fn handle_callback(&self, request: &CallbackRequest) -> CallbackState;

    /// Unique identifier of the user, when the configured field is populated.
    fn uid(&self, state: &CallbackState) -> Option<String>;

    fn credentials(&self, state: &CallbackState) -> Option<Credentials>;

    /// Returns `seed` unchanged when no profile info is available.
    fn info(&self, state: &CallbackState, seed: Info) -> Info;

    fn extra(&self, state: &CallbackState) -> Extra;

    /// Assembles the full [`AuthHash`] for a finished callback.
    ///
    /// # Errors
    ///
    /// Returns [`SlackIdentityError::Callback`] with the attached failures
    /// when the callback did not succeed.
    fn auth_hash(&self, state: &CallbackState) -> Result<AuthHash> {
        if !state.is_success() {
            return Err(SlackIdentityError::Callback(state.errors.clone()).into());
        }

        let credentials = self.credentials(state).ok_or_else(|| {
            SlackIdentityError::Provider("successful callback without credentials".to_string())
        })?;

        Ok(AuthHash {
            provider: self.name().to_string(),
            uid: self.uid(state),
            info: self.info(state, Info::default()),
            credentials,
            extra: self.extra(state),
        })
    }
}

/// Strategies keyed by provider name.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl StrategyRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `strategy` under its own [`Strategy::name`], replacing any
    /// previous strategy with that name.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategies
            .insert(strategy.name().to_string(), strategy);
    }

    /// Get a strategy by provider name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(name).cloned()
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered strategies
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Builds the authorize URL for `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`SlackIdentityError::UnknownProvider`] if nothing is
    /// registered under `provider`.
    pub fn authorize_url(&self, provider: &str, request: &AuthorizeRequest) -> Result<String> {
        Ok(self.require(provider)?.build_authorize_url(request))
    }

    /// Runs the callback for `provider` and assembles the identity.
    ///
    /// # Errors
    ///
    /// Returns [`SlackIdentityError::UnknownProvider`] for unregistered
    /// providers and [`SlackIdentityError::Callback`] when the callback
    /// failed.
    pub async fn callback(&self, provider: &str, request: &CallbackRequest) -> Result<AuthHash> {
        let strategy = self.require(provider)?;
        let state = strategy.handle_callback(request).await;
        strategy.auth_hash(&state)
    }

    fn require(&self, provider: &str) -> Result<Arc<dyn Strategy>> {
        self.get(provider)
            .ok_or_else(|| SlackIdentityError::UnknownProvider(provider.to_string()).into())
    }
}
