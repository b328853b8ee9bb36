//! slack-identity - Sign in with Slack from the command line
//!
#![doc = "Main entry point for the slack-identity binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use slack_identity::cli::{Cli, Commands};
use slack_identity::commands;
use slack_identity::config::Config;
use slack_identity::slack::callback::CallbackRequest;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path)?;
    config.validate()?;

    let registry = commands::build_registry(&config)?;

    match cli.command {
        Commands::AuthorizeUrl { scope, state, team } => {
            tracing::debug!("Building authorize URL");
            let url = commands::authorize_url(&registry, scope, state, team)?;
            println!("{}", url);
            Ok(())
        }
        Commands::Callback {
            code,
            state,
            expected_state,
        } => {
            tracing::info!("Running Slack callback");
            let request = CallbackRequest {
                code,
                state,
                expected_state,
            };
            let output = commands::callback(&registry, request).await?;
            println!("{}", output);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "slack_identity=debug"
    } else {
        "slack_identity=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
