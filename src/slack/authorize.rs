//! Authorize redirect construction
//!
//! Composes the URL the browser is sent to on the initial login hop. Nothing
//! here touches the network and nothing here fails: absent overrides simply
//! leave their query parameter out.

use base64::Engine as _;
use url::Url;

/// Per-request overrides for the authorize redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Scope string replacing the configured default
    pub scope: Option<String>,
    /// Opaque value echoed back on the callback
    pub state: Option<String>,
    /// Slack team (workspace) ID to pre-select on the consent screen
    pub team: Option<String>,
}

/// Builds authorize URLs for one Slack application.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use slack_identity::slack::authorize::{AuthorizeRequest, AuthorizeUrlBuilder};
///
/// let builder = AuthorizeUrlBuilder::new(
///     Url::parse("https://slack.com/oauth/authorize").unwrap(),
///     "client-1",
///     "identity.basic",
///     "https://app.example.com/auth/slack/callback?",
/// );
///
/// let url = builder.build(&AuthorizeRequest::default());
/// assert!(url.contains("scope=identity.basic"));
/// assert!(url.ends_with("redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fslack%2Fcallback"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizeUrlBuilder {
    authorize_endpoint: Url,
    client_id: String,
    default_scope: String,
    redirect_uri: String,
}

impl AuthorizeUrlBuilder {
    /// Creates a builder. A trailing `?` on `callback_url` is trimmed.
    pub fn new(
        authorize_endpoint: Url,
        client_id: impl Into<String>,
        default_scope: impl Into<String>,
        callback_url: &str,
    ) -> Self {
        Self {
            authorize_endpoint,
            client_id: client_id.into(),
            default_scope: default_scope.into(),
            redirect_uri: trim_callback_url(callback_url).to_string(),
        }
    }

    /// The `redirect_uri` sent on both the authorize hop and the token
    /// exchange.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the authorize URL for `request`.
    pub fn build(&self, request: &AuthorizeRequest) -> String {
        let mut url = self.authorize_endpoint.clone();

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.client_id);
            query.append_pair("response_type", "code");
            query.append_pair(
                "scope",
                request.scope.as_deref().unwrap_or(&self.default_scope),
            );
            if let Some(state) = &request.state {
                query.append_pair("state", state);
            }
            if let Some(team) = &request.team {
                query.append_pair("team", team);
            }
            query.append_pair("redirect_uri", &self.redirect_uri);
        }

        url.to_string()
    }
}

/// Strips trailing `?` characters left behind by an empty query string.
pub fn trim_callback_url(callback_url: &str) -> &str {
    callback_url.trim_end_matches('?')
}

/// Generates a random state nonce.
///
/// 16 random bytes encoded as base64url without padding.
pub fn generate_state() -> String {
    use rand::RngCore as _;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
