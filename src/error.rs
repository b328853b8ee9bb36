//! Error types for slack-identity
//!
//! This module defines the crate-level error enum, built with `thiserror`,
//! and the [`CallbackError`] taxonomy that the callback orchestrator attaches
//! to a failed callback.

use thiserror::Error;

/// Main error type for slack-identity operations
///
/// Covers configuration loading, HTTP transport, serialization and the
/// strategy registry. Failures that happen *inside* a callback are not raised
/// through this type; they are accumulated as [`CallbackError`] values and
/// only surface here, wrapped in [`SlackIdentityError::Callback`], when a
/// pipeline asks for an assembled identity from a failed callback.
#[derive(Error, Debug)]
pub enum SlackIdentityError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or unexpected provider responses
    #[error("Provider error: {0}")]
    Provider(String),

    /// A collaborator call produced no usable response
    #[error("Transport error: {0}")]
    Transport(String),

    /// No strategy registered under the requested name
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The callback finished with one or more attached failures
    #[error("Callback failed: {}", format_callback_errors(.0))]
    Callback(Vec<CallbackError>),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn format_callback_errors(errors: &[CallbackError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.kind(), e.message()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for slack-identity operations
///
/// Uses `anyhow::Error` so callers can attach context and downcast to
/// [`SlackIdentityError`] when they need the variant.
pub type Result<T> = anyhow::Result<T>;

/// A failure attached to one callback invocation.
///
/// Every variant is terminal for the callback it belongs to; nothing in the
/// flow retries. The enclosing pipeline decides how to present it.
///
/// # Examples
///
/// ```
/// use slack_identity::error::CallbackError;
///
/// let err = CallbackError::provider("invalid_auth", None);
/// assert_eq!(err.kind(), "provider_error");
/// assert_eq!(err.message(), "invalid_auth");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// The inbound request carried no authorization code
    #[error("authorization code missing from callback")]
    MissingCode,

    /// The `state` echoed by the provider did not match the one issued
    #[error("state mismatch in callback")]
    CsrfDetected,

    /// The provider answered an API call with `401 Unauthorized`
    #[error("provider rejected the access token")]
    Unauthorized,

    /// The provider reported an error in its response body
    #[error("provider error {code}")]
    ProviderError {
        /// Provider error code, e.g. `invalid_auth`
        code: String,
        /// Human-readable description when the provider sent one
        description: Option<String>,
    },

    /// The call never produced a usable response
    #[error("transport error: {reason}")]
    Transport {
        /// Why the call failed
        reason: String,
    },
}

impl CallbackError {
    /// Builds a [`CallbackError::ProviderError`].
    pub fn provider(code: impl Into<String>, description: Option<String>) -> Self {
        Self::ProviderError {
            code: code.into(),
            description,
        }
    }

    /// Builds a [`CallbackError::Transport`].
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Stable string token identifying the failure category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCode => "missing_code",
            Self::CsrfDetected => "csrf_detected",
            Self::Unauthorized => "unauthorized",
            Self::ProviderError { .. } => "provider_error",
            Self::Transport { .. } => "transport_error",
        }
    }

    /// Message presented alongside [`kind`](Self::kind).
    ///
    /// Provider errors use the description when present and fall back to the
    /// code; transport errors use the transport reason.
    pub fn message(&self) -> String {
        match self {
            Self::ProviderError { code, description } => {
                description.clone().unwrap_or_else(|| code.clone())
            }
            Self::Transport { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = SlackIdentityError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_unknown_provider_display() {
        let error = SlackIdentityError::UnknownProvider("github".to_string());
        assert_eq!(error.to_string(), "Unknown provider: github");
    }

    #[test]
    fn test_callback_error_display_lists_every_failure() {
        let error = SlackIdentityError::Callback(vec![
            CallbackError::Unauthorized,
            CallbackError::transport("connection reset"),
        ]);
        let text = error.to_string();
        assert!(text.contains("unauthorized"));
        assert!(text.contains("transport_error: connection reset"));
    }

    #[test]
    fn test_kind_tokens() {
        assert_eq!(CallbackError::MissingCode.kind(), "missing_code");
        assert_eq!(CallbackError::CsrfDetected.kind(), "csrf_detected");
        assert_eq!(CallbackError::Unauthorized.kind(), "unauthorized");
        assert_eq!(CallbackError::provider("x", None).kind(), "provider_error");
        assert_eq!(CallbackError::transport("x").kind(), "transport_error");
    }

    #[test]
    fn test_provider_message_prefers_description() {
        let err = CallbackError::provider("invalid_code", Some("Code expired".to_string()));
        assert_eq!(err.message(), "Code expired");

        let err = CallbackError::provider("invalid_code", None);
        assert_eq!(err.message(), "invalid_code");
    }

    #[test]
    fn test_transport_message_is_reason() {
        let err = CallbackError::transport("timed out");
        assert_eq!(err.message(), "timed out");
    }

    #[test]
    fn test_transport_display() {
        let error = SlackIdentityError::Transport("connection reset".to_string());
        assert_eq!(error.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: SlackIdentityError = json_err.into();
        assert!(matches!(error, SlackIdentityError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("key: [unclosed").unwrap_err();
        let error: SlackIdentityError = yaml_err.into();
        assert!(matches!(error, SlackIdentityError::Yaml(_)));
    }
}
