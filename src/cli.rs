//! Command-line interface definition for slack-identity
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// slack-identity - Sign in with Slack from the command line
///
/// Builds authorize URLs and runs the OAuth callback against the Slack Web
/// API, printing the normalized identity.
#[derive(Parser, Debug, Clone)]
#[command(name = "slack-identity")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for slack-identity
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the URL that starts the Slack consent flow
    AuthorizeUrl {
        /// Scope to request instead of the configured default
        #[arg(long)]
        scope: Option<String>,

        /// State value to echo back (a random one is generated if omitted)
        #[arg(long)]
        state: Option<String>,

        /// Slack team ID to pre-select
        #[arg(long)]
        team: Option<String>,
    },

    /// Exchange an authorization code and print the resulting identity
    Callback {
        /// Authorization code from the redirect
        #[arg(long)]
        code: Option<String>,

        /// State value received on the redirect
        #[arg(long)]
        state: Option<String>,

        /// State value issued with the authorize URL
        #[arg(long)]
        expected_state: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_authorize_url_defaults() {
        let cli = Cli::try_parse_from(["slack-identity", "authorize-url"]).unwrap();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        if let Commands::AuthorizeUrl { scope, state, team } = cli.command {
            assert!(scope.is_none());
            assert!(state.is_none());
            assert!(team.is_none());
        } else {
            panic!("Expected AuthorizeUrl command");
        }
    }

    #[test]
    fn test_cli_parse_authorize_url_overrides() {
        let cli = Cli::try_parse_from([
            "slack-identity",
            "authorize-url",
            "--scope",
            "identity.basic,identity.email",
            "--team",
            "T123",
        ])
        .unwrap();
        if let Commands::AuthorizeUrl { scope, team, .. } = cli.command {
            assert_eq!(scope.as_deref(), Some("identity.basic,identity.email"));
            assert_eq!(team.as_deref(), Some("T123"));
        } else {
            panic!("Expected AuthorizeUrl command");
        }
    }

    #[test]
    fn test_cli_parse_callback() {
        let cli = Cli::try_parse_from([
            "slack-identity",
            "--verbose",
            "callback",
            "--code",
            "abc",
            "--expected-state",
            "s1",
        ])
        .unwrap();
        assert!(cli.verbose);
        if let Commands::Callback {
            code,
            state,
            expected_state,
        } = cli.command
        {
            assert_eq!(code.as_deref(), Some("abc"));
            assert!(state.is_none());
            assert_eq!(expected_state.as_deref(), Some("s1"));
        } else {
            panic!("Expected Callback command");
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["slack-identity"]).is_err());
    }
}
