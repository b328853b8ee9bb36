//! Slack wire records
//!
//! Deserialization targets for the token exchange response, the
//! `auth.test` verification response and the `users.identity` profile
//! response, plus the canonical [`Token`] derived from the exchange.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CallbackError;

/// Scope that authorizes the `users.identity` profile fetch.
pub const PROFILE_SCOPE: &str = "identity.basic";

/// Splits a comma-separated scope field into granted scopes.
///
/// Order is preserved and entries are not trimmed. An absent or empty field
/// yields no scopes.
///
/// # Examples
///
/// ```
/// use slack_identity::slack::types::parse_scopes;
///
/// assert_eq!(
///     parse_scopes(Some("identity.basic,channels:read")),
///     vec!["identity.basic".to_string(), "channels:read".to_string()]
/// );
/// assert!(parse_scopes(Some("")).is_empty());
/// assert!(parse_scopes(None).is_empty());
/// ```
pub fn parse_scopes(scope: Option<&str>) -> Vec<String> {
    match scope {
        Some(s) if !s.is_empty() => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// Raw JSON response from the token exchange endpoint.
///
/// Every field is optional because Slack answers failed exchanges with the
/// same envelope, carrying `ok: false` and `error` instead of a token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Converts the raw response into a [`Token`].
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::ProviderError`] built from `error` /
    /// `error_description` when no access token was issued.
    pub fn into_token(self) -> std::result::Result<Token, CallbackError> {
        let access_token = match self.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(CallbackError::provider(
                    self.error.unwrap_or_else(|| "unknown_error".to_string()),
                    self.error_description,
                ))
            }
        };

        let expires_at = self
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        let granted_scopes = parse_scopes(self.scope.as_deref());

        Ok(Token {
            access_token,
            refresh_token: self.refresh_token,
            expires_at,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            scope: self.scope,
            granted_scopes,
        })
    }
}

/// An access token issued for one callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
    /// The raw comma-separated scope field as Slack returned it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub granted_scopes: Vec<String>,
}

// ---------------------------------------------------------------------------
// auth.test
// ---------------------------------------------------------------------------

/// Body of an `auth.test` response: who the token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthVerification {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Required: the profile fetch targets this user.
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Workspace URL, e.g. `https://acme.slack.com/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// users.identity
// ---------------------------------------------------------------------------

/// Body of a `users.identity` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub user: IdentityUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `user` object of a `users.identity` response.
///
/// Besides the named fields Slack sends a variable set of `image_<size>`
/// avatar URLs; those land in `fields` together with anything else not
/// modelled here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_48: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Value>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl IdentityUser {
    /// Every `image_*` field that carries a string URL, keyed by field name.
    pub fn image_urls(&self) -> BTreeMap<String, String> {
        let mut urls: BTreeMap<String, String> = self
            .fields
            .iter()
            .filter(|(key, _)| key.starts_with("image_"))
            .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
            .collect();
        if let Some(image_48) = &self.image_48 {
            urls.insert("image_48".to_string(), image_48.clone());
        }
        urls
    }
}
