//! Normalized identity records
//!
//! The shapes every strategy hands to the pipeline, independent of the
//! provider they came from.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token credentials of an authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
    /// `true` when `expires_at` is set
    pub expires: bool,
    pub scopes: Vec<String>,
    /// Provider-specific extras (for Slack: user, team and workspace URL)
    #[serde(default)]
    pub other: BTreeMap<String, Option<String>>,
}

/// Human-readable profile of an authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub urls: BTreeMap<String, String>,
}

impl Info {
    /// Looks up a scalar field by name.
    ///
    /// Returns `None` for unknown names and for fields never populated.
    ///
    /// # Examples
    ///
    /// ```
    /// use slack_identity::strategy::Info;
    ///
    /// let info = Info { email: Some("ann@x.com".to_string()), ..Default::default() };
    /// assert_eq!(info.field("email"), Some("ann@x.com"));
    /// assert_eq!(info.field("name"), None);
    /// assert_eq!(info.field("shoe_size"), None);
    /// ```
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => self.name.as_deref(),
            "nickname" => self.nickname.as_deref(),
            "email" => self.email.as_deref(),
            "image" => self.image.as_deref(),
            _ => None,
        }
    }
}

/// Raw provider data kept for consumers that need unmapped fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    pub raw_info: Map<String, Value>,
}

/// The full normalized identity produced by a successful callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthHash {
    pub provider: String,
    pub uid: Option<String>,
    pub info: Info,
    pub credentials: Credentials,
    pub extra: Extra,
}
