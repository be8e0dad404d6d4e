//! Slack notifications for CI build events.
//!
//! This crate renders a build status message (repository, commit, author,
//! status) and posts it to a Slack incoming webhook. It is meant to run as a
//! CI pipeline step: one invocation handles exactly one build event.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{Config, Plugin, SlackWebhook};
//!
//! # async fn run() -> Result<(), notify::NotifyError> {
//! let mut plugin = Plugin::default();
//! plugin.config = Config::new("https://hooks.slack.com/services/T000/B000/XXXX");
//!
//! let sender = SlackWebhook::new(plugin.config.webhook.clone())?;
//! plugin.exec(&sender).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`message`] composes the default body, fallback text, color and icon
//! - [`TemplateEngine`] renders user-supplied Handlebars templates
//! - [`NotificationSender`] is the delivery capability injected into [`Plugin::exec`]
//! - [`SlackWebhook`] implements delivery over HTTP
//! - [`cli::Cli`] binds flags and `PLUGIN_*`/`DRONE_*` environment variables

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod message;
pub mod plugin;
pub mod template;

pub use channels::slack::{Attachment, SlackWebhook, WebhookPayload};
pub use channels::NotificationSender;
pub use config::{Config, Recipient};
pub use error::NotifyError;
pub use events::{Author, Build, BuildStatus, CommitMessage, Job, Repo};
pub use plugin::{Plugin, RenderedMessage};
pub use template::TemplateEngine;
