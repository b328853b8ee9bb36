//! Callback orchestration
//!
//! Drives one callback invocation from the inbound authorization code to a
//! verified identity:
//!
//! ```text
//! Start -> TokenExchanged -> Verified -> ProfileFetched | ProfileSkipped -> Done
//!   \__________________\___________\__________________________________-> Failed
//! ```
//!
//! 1. `Start` requires a non-empty `code` (and, when the pipeline supplied
//!    one, a matching `state`). Nothing is sent before these checks pass.
//! 2. The code is exchanged for a [`Token`]; a reply without an access token
//!    fails the callback with the provider's error. The exchange status goes
//!    through the same [`check_status`] rule as the Web API calls.
//! 3. The token is verified with `auth.test`, which must name a `user_id`.
//! 4. If the granted scopes include `identity.basic`, the profile is fetched
//!    with `users.identity`; otherwise the fetch is skipped, which is not a
//!    failure.
//!
//! Every failure is terminal and is attached to the returned
//! [`CallbackState`]; nothing is retried.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CallbackError, SlackIdentityError};
use crate::slack::client::{ApiResponse, TokenClient};
use crate::slack::types::{
    parse_scopes, AuthVerification, Token, TokenResponse, UserProfile, PROFILE_SCOPE,
};

/// Web API method that verifies a token.
pub const AUTH_TEST_PATH: &str = "/api/auth.test";

/// Web API method that returns the signed-in user's profile.
pub const USERS_IDENTITY_PATH: &str = "/api/users.identity";

/// Inbound callback parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackRequest {
    /// Authorization code from the consent redirect
    pub code: Option<String>,
    /// `state` echoed back by Slack
    pub state: Option<String>,
    /// `state` issued on the authorize hop, when the pipeline tracks it
    pub expected_state: Option<String>,
}

impl CallbackRequest {
    /// A request carrying only an authorization code.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }
}

/// Where a callback stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPhase {
    Start,
    TokenExchanged,
    Verified,
    ProfileFetched,
    ProfileSkipped,
    Done,
    Failed,
}

/// Everything one callback produced.
///
/// Owned by a single invocation and handed to the identity assembler; never
/// shared between callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackState {
    pub phase: CallbackPhase,
    pub token: Option<Token>,
    pub auth: Option<AuthVerification>,
    pub user: Option<UserProfile>,
    /// Failures in the order they were attached
    pub errors: Vec<CallbackError>,
}

impl Default for CallbackState {
    fn default() -> Self {
        Self {
            phase: CallbackPhase::Start,
            token: None,
            auth: None,
            user: None,
            errors: Vec::new(),
        }
    }
}

impl CallbackState {
    /// A fresh state in [`CallbackPhase::Start`].
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once any failure has been attached.
    pub fn has_failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `true` when the callback reached [`CallbackPhase::Done`] cleanly.
    pub fn is_success(&self) -> bool {
        self.phase == CallbackPhase::Done && self.errors.is_empty()
    }

    /// Attaches `error` and moves to [`CallbackPhase::Failed`].
    pub fn fail(&mut self, error: CallbackError) {
        tracing::warn!("Callback failed in {:?}: {}", self.phase, error);
        self.errors.push(error);
        self.phase = CallbackPhase::Failed;
    }

    fn advance(&mut self, phase: CallbackPhase) {
        tracing::debug!("Callback {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Runs callbacks against a [`TokenClient`].
///
/// Holds no per-callback data, so one orchestrator serves any number of
/// concurrent callbacks.
#[derive(Debug, Clone)]
pub struct CallbackOrchestrator {
    client: Arc<dyn TokenClient>,
    redirect_uri: String,
}

impl CallbackOrchestrator {
    /// Creates an orchestrator that exchanges codes for `redirect_uri`.
    pub fn new(client: Arc<dyn TokenClient>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Runs one callback to completion.
    ///
    /// Never returns an error: failures are attached to the returned state,
    /// which ends in either [`CallbackPhase::Done`] or
    /// [`CallbackPhase::Failed`].
    pub async fn run(&self, request: &CallbackRequest) -> CallbackState {
        let mut state = CallbackState::new();

        if let Err(error) = self.drive(request, &mut state).await {
            state.fail(error);
            return state;
        }

        state.advance(CallbackPhase::Done);
        if let Some(auth) = &state.auth {
            tracing::info!(
                "Slack callback completed for user {} (profile {})",
                auth.user_id,
                if state.user.is_some() { "fetched" } else { "skipped" }
            );
        }
        state
    }

    async fn drive(
        &self,
        request: &CallbackRequest,
        state: &mut CallbackState,
    ) -> Result<(), CallbackError> {
        let code = request
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or(CallbackError::MissingCode)?;

        if let Some(expected) = &request.expected_state {
            if request.state.as_deref() != Some(expected.as_str()) {
                return Err(CallbackError::CsrfDetected);
            }
        }

        let token = self.exchange(code).await?;
        state.token = Some(token.clone());
        state.advance(CallbackPhase::TokenExchanged);

        let auth: AuthVerification = self
            .call_api(AUTH_TEST_PATH, &token.access_token, &[])
            .await?;
        if auth.user_id.is_empty() {
            return Err(CallbackError::transport(format!(
                "{AUTH_TEST_PATH} response has an empty user_id"
            )));
        }
        let user_id = auth.user_id.clone();
        state.auth = Some(auth);
        state.advance(CallbackPhase::Verified);

        let scopes = parse_scopes(token.scope.as_deref());
        if !scopes.iter().any(|scope| scope == PROFILE_SCOPE) {
            tracing::debug!("{} not granted; skipping profile fetch", PROFILE_SCOPE);
            state.advance(CallbackPhase::ProfileSkipped);
            return Ok(());
        }

        self.fetch_profile(&token, &user_id, state).await
    }

    async fn exchange(&self, code: &str) -> Result<Token, CallbackError> {
        let response = self
            .client
            .exchange_code(code, &self.redirect_uri)
            .await
            .map_err(transport_failure)?;
        check_status(response.status)?;

        let raw: TokenResponse = match response.body {
            Value::Null => TokenResponse::default(),
            body => serde_json::from_value(body).map_err(|e| {
                CallbackError::transport(format!("malformed token response: {e}"))
            })?,
        };

        raw.into_token()
    }

    async fn fetch_profile(
        &self,
        token: &Token,
        user_id: &str,
        state: &mut CallbackState,
    ) -> Result<(), CallbackError> {
        if state.has_failed() {
            tracing::debug!("Callback already failed; not fetching profile");
            return Ok(());
        }

        let profile: UserProfile = self
            .call_api(USERS_IDENTITY_PATH, &token.access_token, &[("user", user_id)])
            .await?;
        state.user = Some(profile);
        state.advance(CallbackPhase::ProfileFetched);
        Ok(())
    }

    /// Issues a Web API call and decodes its body after status triage.
    async fn call_api<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CallbackError> {
        let response = self
            .client
            .get(path, access_token, query)
            .await
            .map_err(transport_failure)?;

        let body = triage(response)?;
        serde_json::from_value(body)
            .map_err(|e| CallbackError::transport(format!("malformed {path} response: {e}")))
    }
}

/// Maps a collaborator failure to a transport error carrying its bare reason.
fn transport_failure(error: anyhow::Error) -> CallbackError {
    let reason = match error.downcast_ref::<SlackIdentityError>() {
        Some(SlackIdentityError::Transport(reason)) => reason.clone(),
        Some(SlackIdentityError::Http(e)) => e.to_string(),
        _ => error.root_cause().to_string(),
    };
    CallbackError::transport(reason)
}

/// Status rule shared by the token exchange and the Web API calls.
///
/// - `401` is [`CallbackError::Unauthorized`] whatever the body says.
/// - `[200, 400)` passes; the caller inspects the body.
/// - Any other status is a [`CallbackError::Transport`]; its body is not
///   inspected.
pub fn check_status(status: u16) -> Result<(), CallbackError> {
    match status {
        401 => Err(CallbackError::Unauthorized),
        200..=399 => Ok(()),
        status => Err(CallbackError::transport(format!(
            "unexpected HTTP status {status}"
        ))),
    }
}

/// Classifies a Web API response.
///
/// After [`check_status`], returns the body when it carries `"ok": true`,
/// otherwise a [`CallbackError::ProviderError`] whose code and message are
/// the body's `error` field.
pub fn triage(response: ApiResponse) -> Result<Value, CallbackError> {
    check_status(response.status)?;

    if response.body.get("ok").and_then(Value::as_bool) == Some(true) {
        Ok(response.body)
    } else {
        let code = response
            .body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        Err(CallbackError::provider(code.clone(), Some(code)))
    }
}
