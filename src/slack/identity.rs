//! Identity assembly
//!
//! Read-only projections from a finished [`CallbackState`] into the
//! normalized [`Credentials`], [`Info`] and [`Extra`] records. Each function
//! may be called any number of times; none of them mutates the state.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::slack::callback::CallbackState;
use crate::strategy::{Credentials, Extra, Info};

/// Credentials for a verified token.
///
/// Returns `None` unless both the token and its `auth.test` record are
/// present, which only holds after a successful callback.
pub fn credentials(state: &CallbackState) -> Option<Credentials> {
    let token = state.token.as_ref()?;
    let auth = state.auth.as_ref()?;

    let mut other = BTreeMap::new();
    other.insert("user".to_string(), auth.user.clone());
    other.insert("user_id".to_string(), Some(auth.user_id.clone()));
    other.insert("team".to_string(), auth.team.clone());
    other.insert("team_id".to_string(), auth.team_id.clone());
    other.insert("team_url".to_string(), auth.url.clone());

    Some(Credentials {
        token: token.access_token.clone(),
        refresh_token: token.refresh_token.clone(),
        expires_at: token.expires_at,
        token_type: token.token_type.clone(),
        expires: token.expires_at.is_some(),
        scopes: token.granted_scopes.clone(),
        other,
    })
}

/// Profile info for the signed-in user.
///
/// When no profile was fetched `seed` is returned untouched, signalling that
/// no info is available. Otherwise name, nickname, email and image come from
/// the profile and `urls` holds every `image_*` URL plus `team_url`.
pub fn info(state: &CallbackState, seed: Info) -> Info {
    let Some(profile) = &state.user else {
        return seed;
    };
    let user = &profile.user;

    let mut urls = user.image_urls();
    if let Some(team_url) = state.auth.as_ref().and_then(|auth| auth.url.clone()) {
        urls.insert("team_url".to_string(), team_url);
    }

    Info {
        name: user.name.clone(),
        nickname: user.name.clone(),
        email: user.email.clone(),
        image: user.image_48.clone(),
        urls,
    }
}

/// Looks up `uid_field` in the assembled info.
///
/// `None` when the field was never populated, e.g. because the profile
/// fetch was skipped.
pub fn uid(state: &CallbackState, uid_field: &str) -> Option<String> {
    info(state, Info::default())
        .field(uid_field)
        .map(str::to_string)
}

/// Raw provider records under `raw_info`, each key present only when the
/// corresponding record is.
pub fn extra(state: &CallbackState) -> Extra {
    let mut raw_info = Map::new();
    insert_raw(&mut raw_info, "auth", state.auth.as_ref());
    insert_raw(&mut raw_info, "token", state.token.as_ref());
    insert_raw(&mut raw_info, "user", state.user.as_ref());
    Extra { raw_info }
}

fn insert_raw<T: Serialize>(raw_info: &mut Map<String, Value>, key: &str, record: Option<&T>) {
    let Some(record) = record else {
        return;
    };
    match serde_json::to_value(record) {
        Ok(value) => {
            raw_info.insert(key.to_string(), value);
        }
        Err(e) => tracing::warn!("Failed to serialize raw {} record: {}", key, e),
    }
}
