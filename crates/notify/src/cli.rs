//! Command-line and environment binding.
//!
//! Every flag can also be set through the environment variable the CI
//! exports for plugins (`PLUGIN_*`) or for build metadata (`DRONE_*`).

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::{Config, Recipient};
use crate::events::{Author, Build, CommitMessage, Job, Repo};
use crate::plugin::Plugin;

/// Send CI build notifications to a Slack incoming webhook.
#[derive(Debug, Parser)]
#[command(name = "build-notify")]
#[command(version, about = "Send CI build notifications to a Slack incoming webhook")]
pub struct Cli {
    /// Dotenv file loaded before reading the environment.
    #[arg(long, env = "PLUGIN_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    // =========================================================================
    // Plugin settings
    // =========================================================================
    /// Slack incoming webhook URL.
    #[arg(long, env = "PLUGIN_WEBHOOK", hide_env_values = true)]
    pub webhook: Option<String>,

    /// Alternate webhook variable, used when `PLUGIN_WEBHOOK` is unset.
    #[arg(long, env = "SLACK_WEBHOOK", hide_env_values = true, hide = true)]
    pub slack_webhook: Option<String>,

    /// Channel to post to.
    #[arg(long, env = "PLUGIN_CHANNEL")]
    pub channel: Option<String>,

    /// User to message directly. Takes precedence over `--channel`.
    #[arg(long, env = "PLUGIN_RECIPIENT")]
    pub recipient: Option<String>,

    /// Display name for the bot.
    #[arg(long, env = "PLUGIN_USERNAME")]
    pub username: Option<String>,

    /// Handlebars template for the message body.
    #[arg(long, env = "PLUGIN_TEMPLATE")]
    pub template: Option<String>,

    /// Handlebars template for the fallback text.
    #[arg(long, env = "PLUGIN_FALLBACK")]
    pub fallback: Option<String>,

    /// Image shown inside the attachment.
    #[arg(long, env = "PLUGIN_IMAGE_URL")]
    pub image_url: Option<String>,

    /// Bot avatar URL.
    #[arg(long, env = "PLUGIN_ICON_URL")]
    pub icon_url: Option<String>,

    /// Bot avatar emoji.
    #[arg(long, env = "PLUGIN_ICON_EMOJI")]
    pub icon_emoji: Option<String>,

    /// Attachment color, replacing the status color.
    #[arg(long, env = "PLUGIN_COLOR")]
    pub color: Option<String>,

    /// Linkify `@user` and `#channel` mentions.
    #[arg(long, env = "PLUGIN_LINK_NAMES", value_parser = BoolishValueParser::new())]
    pub link_names: bool,

    /// Hostname for the internal CI link.
    #[arg(long, env = "PLUGIN_HOST_INTERNAL")]
    pub host_internal: Option<String>,

    /// Hostname for the external CI link.
    #[arg(long, env = "PLUGIN_HOST_EXTERNAL")]
    pub host_external: Option<String>,

    // =========================================================================
    // Build metadata
    // =========================================================================
    #[arg(long, env = "DRONE_REPO_OWNER", default_value = "")]
    pub repo_owner: String,

    #[arg(long, env = "DRONE_REPO_NAME", default_value = "")]
    pub repo_name: String,

    #[arg(long, env = "DRONE_REPO_LINK", default_value = "")]
    pub repo_link: String,

    #[arg(long, env = "DRONE_COMMIT_SHA", default_value = "")]
    pub commit_sha: String,

    #[arg(long, env = "DRONE_COMMIT_REF", default_value = "refs/heads/master")]
    pub commit_ref: String,

    #[arg(long, env = "DRONE_COMMIT_BRANCH", default_value = "master")]
    pub commit_branch: String,

    #[arg(long, env = "DRONE_COMMIT_AUTHOR", default_value = "")]
    pub commit_author: String,

    #[arg(long, env = "DRONE_COMMIT_AUTHOR_NAME", default_value = "")]
    pub commit_author_name: String,

    #[arg(long, env = "DRONE_COMMIT_AUTHOR_EMAIL", default_value = "")]
    pub commit_author_email: String,

    #[arg(long, env = "DRONE_COMMIT_AUTHOR_AVATAR", default_value = "")]
    pub commit_author_avatar: String,

    #[arg(long, env = "DRONE_COMMIT_MESSAGE", default_value = "")]
    pub commit_message: String,

    #[arg(long, env = "DRONE_BUILD_EVENT", default_value = "push")]
    pub build_event: String,

    #[arg(long, env = "DRONE_BUILD_NUMBER", default_value_t = 0)]
    pub build_number: u64,

    #[arg(long, env = "DRONE_BUILD_PARENT", default_value_t = 0)]
    pub build_parent: u64,

    #[arg(long, env = "DRONE_BUILD_STATUS", default_value = "success")]
    pub build_status: String,

    #[arg(long, env = "DRONE_BUILD_LINK", default_value = "")]
    pub build_link: String,

    #[arg(long, env = "DRONE_BUILD_STARTED", default_value_t = 0)]
    pub build_started: i64,

    #[arg(long, env = "DRONE_BUILD_CREATED", default_value_t = 0)]
    pub build_created: i64,

    #[arg(long, env = "DRONE_TAG", default_value = "")]
    pub build_tag: String,

    #[arg(long, env = "DRONE_PULL_REQUEST", default_value = "")]
    pub pull_request: String,

    #[arg(long, env = "DRONE_DEPLOY_TO", default_value = "")]
    pub deploy_to: String,

    #[arg(long, env = "DRONE_JOB_STARTED", default_value_t = 0)]
    pub job_started: i64,
}

impl Cli {
    /// Parse arguments and the environment, loading `--env-file` first when given.
    ///
    /// Values from the env file only fill variables that are not already set,
    /// so the arguments are parsed again once it is loaded.
    ///
    /// # Errors
    /// Returns the [`clap::Error`] for invalid arguments (including `--help`
    /// and `--version`), or an error if the env file cannot be loaded.
    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let cli = Self::try_parse_from(&args)?;

        let Some(path) = cli.env_file.as_deref() else {
            return Ok(cli);
        };
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load env file: {}", path.display()))?;

        Ok(Self::try_parse_from(&args)?)
    }

    /// Webhook URL from `PLUGIN_WEBHOOK`, falling back to `SLACK_WEBHOOK`.
    #[must_use]
    pub fn webhook_url(&self) -> Option<&str> {
        [self.webhook.as_deref(), self.slack_webhook.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
    }

    /// Assemble the plugin bundle. The webhook is left empty when unset.
    #[must_use]
    pub fn into_plugin(self) -> Plugin {
        let webhook = self.webhook_url().unwrap_or_default().to_string();
        let recipient = Recipient::select(self.recipient.as_deref(), self.channel.as_deref());

        Plugin {
            repo: Repo {
                owner: self.repo_owner,
                name: self.repo_name,
                link: self.repo_link,
            },
            build: Build {
                event: self.build_event,
                number: self.build_number,
                parent: self.build_parent,
                commit: self.commit_sha,
                git_ref: self.commit_ref,
                branch: self.commit_branch,
                tag: self.build_tag,
                pull: self.pull_request,
                deploy_to: self.deploy_to,
                status: self.build_status.into(),
                author: Author {
                    username: self.commit_author,
                    name: self.commit_author_name,
                    email: self.commit_author_email,
                    avatar: self.commit_author_avatar,
                },
                message: CommitMessage::new(self.commit_message),
                link: self.build_link,
                started: self.build_started,
                created: self.build_created,
            },
            config: Config {
                webhook,
                recipient,
                username: self.username,
                template: self.template,
                fallback: self.fallback,
                color: self.color,
                image_url: self.image_url,
                icon_url: self.icon_url,
                icon_emoji: self.icon_emoji,
                host_internal: self.host_internal,
                host_external: self.host_external,
                link_names: self.link_names,
            },
            job: Job {
                started: self.job_started,
            },
        }
    }
}
