//! slack-identity - "Sign in with Slack" as a pluggable identity strategy
//!
//! This library turns a Slack OAuth authorization code into a normalized
//! identity (credentials, profile info and raw provider data) that a
//! multi-provider authentication pipeline can consume.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `strategy`: provider-neutral `Strategy` contract, normalized records and
//!   the provider registry
//! - `slack`: the Slack strategy (authorize URL, callback orchestration,
//!   identity assembly, HTTP collaborator)
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use slack_identity::{Config, SlackStrategy, StrategyRegistry};
//! use slack_identity::slack::callback::CallbackRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml")?;
//!     config.validate()?;
//!
//!     let mut registry = StrategyRegistry::new();
//!     registry.register(Arc::new(SlackStrategy::from_config(&config.slack)?));
//!
//!     let identity = registry
//!         .callback("slack", &CallbackRequest::with_code("code-from-redirect"))
//!         .await?;
//!     println!("{:?}", identity.uid);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod slack;
pub mod strategy;

// Re-export commonly used types
pub use config::Config;
pub use error::{CallbackError, Result, SlackIdentityError};
pub use slack::SlackStrategy;
pub use strategy::{AuthHash, Strategy, StrategyRegistry};
