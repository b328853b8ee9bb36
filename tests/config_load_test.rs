//! Configuration loading tests
//!
//! Covers YAML parsing, defaults for a missing file, and environment
//! overrides. Tests touching `SLACK_IDENTITY_*` variables run serially.

use std::env;

use serial_test::serial;
use slack_identity::config::Config;
use slack_identity::SlackIdentityError;

mod common;

const ENV_VARS: [&str; 6] = [
    "SLACK_IDENTITY_CLIENT_ID",
    "SLACK_IDENTITY_CLIENT_SECRET",
    "SLACK_IDENTITY_CALLBACK_URL",
    "SLACK_IDENTITY_SITE",
    "SLACK_IDENTITY_UID_FIELD",
    "SLACK_IDENTITY_TIMEOUT_SECONDS",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_load_reads_yaml_file() {
    clear_env();
    let (_dir, path) = common::temp_config_file(
        "slack:\n  client_id: abc\n  client_secret: def\n  uid_field: name\n  default_scope: \"identity.basic,identity.email\"\n  timeout_seconds: 12\n",
    );

    let config = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(config.slack.client_id, "abc");
    assert_eq!(config.slack.client_secret, "def");
    assert_eq!(config.slack.uid_field, "name");
    assert_eq!(config.slack.default_scope, "identity.basic,identity.email");
    assert_eq!(config.slack.timeout_seconds, 12);
    // Unset keys keep their defaults.
    assert_eq!(config.slack.site, "https://slack.com");
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_load_missing_file_uses_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let config = Config::load(path.to_str().unwrap()).unwrap();

    assert!(config.slack.client_id.is_empty());
    assert_eq!(config.slack.uid_field, "email");
    assert!(config.validate().is_err(), "empty client_id must not validate");
}

#[test]
#[serial]
fn test_load_rejects_malformed_yaml() {
    clear_env();
    let (_dir, path) = common::temp_config_file("slack: [unclosed");

    let err = Config::load(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
    assert!(matches!(
        err.downcast_ref::<SlackIdentityError>(),
        Some(SlackIdentityError::Yaml(_))
    ));
}

#[test]
#[serial]
fn test_load_unreadable_path_is_io_error() {
    clear_env();
    // A directory exists but cannot be read as a file.
    let dir = tempfile::tempdir().unwrap();

    let err = Config::load(dir.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
    assert!(matches!(
        err.downcast_ref::<SlackIdentityError>(),
        Some(SlackIdentityError::Io(_))
    ));
}

#[test]
#[serial]
fn test_env_vars_override_file() {
    clear_env();
    let (_dir, path) = common::temp_config_file(common::VALID_CONFIG);

    env::set_var("SLACK_IDENTITY_CLIENT_ID", "from-env");
    env::set_var("SLACK_IDENTITY_SITE", "http://127.0.0.1:8080");
    env::set_var("SLACK_IDENTITY_UID_FIELD", "nickname");
    env::set_var("SLACK_IDENTITY_TIMEOUT_SECONDS", "7");

    let config = Config::load(path.to_str().unwrap()).unwrap();
    clear_env();

    assert_eq!(config.slack.client_id, "from-env");
    assert_eq!(config.slack.client_secret, "shh");
    assert_eq!(config.slack.site, "http://127.0.0.1:8080");
    assert_eq!(config.slack.uid_field, "nickname");
    assert_eq!(config.slack.timeout_seconds, 7);
}

#[test]
#[serial]
fn test_invalid_timeout_env_is_ignored() {
    clear_env();
    let (_dir, path) = common::temp_config_file(common::VALID_CONFIG);

    env::set_var("SLACK_IDENTITY_TIMEOUT_SECONDS", "soon");
    let config = Config::load(path.to_str().unwrap()).unwrap();
    clear_env();

    assert_eq!(config.slack.timeout_seconds, 30);
}

#[test]
#[serial]
fn test_validate_rejects_unknown_uid_field() {
    clear_env();
    let (_dir, path) =
        common::temp_config_file("slack:\n  client_id: abc\n  uid_field: team\n");

    let config = Config::load(path.to_str().unwrap()).unwrap();
    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("Invalid uid_field"));
}
