//! Plugin configuration.

use serde::Serialize;

/// Where the message is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Recipient {
    /// Direct message to a user (`@user`)
    User(String),
    /// Post to a channel (`#channel`)
    Channel(String),
}

impl Recipient {
    /// Pick a recipient from the raw user/channel settings.
    ///
    /// A direct-message user wins over a channel; blank values count as unset.
    #[must_use]
    pub fn select(user: Option<&str>, channel: Option<&str>) -> Option<Self> {
        let non_blank = |s: &&str| !s.trim().is_empty();

        if let Some(user) = user.filter(non_blank) {
            Some(Self::User(user.trim().to_string()))
        } else {
            channel
                .filter(non_blank)
                .map(|channel| Self::Channel(channel.trim().to_string()))
        }
    }
}

/// Notification settings for one invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    /// Incoming webhook URL. Never exposed to templates.
    #[serde(skip_serializing)]
    pub webhook: String,
    pub recipient: Option<Recipient>,
    pub username: Option<String>,
    /// Handlebars template replacing the default message body
    pub template: Option<String>,
    /// Handlebars template replacing the default fallback text
    pub fallback: Option<String>,
    /// Attachment color override (`good`, `danger`, `#439FE0`, ...)
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub icon_url: Option<String>,
    pub icon_emoji: Option<String>,
    pub host_internal: Option<String>,
    pub host_external: Option<String>,
    /// Ask Slack to linkify `@user` and `#channel` mentions
    pub link_names: bool,
}

impl Config {
    #[must_use]
    pub fn new(webhook: impl Into<String>) -> Self {
        Self {
            webhook: webhook.into(),
            ..Self::default()
        }
    }

    /// Internal and external hostnames, only when both are configured.
    #[must_use]
    pub fn host_rewrite(&self) -> Option<(&str, &str)> {
        match (self.host_internal.as_deref(), self.host_external.as_deref()) {
            (Some(internal), Some(external)) if !internal.is_empty() && !external.is_empty() => {
                Some((internal, external))
            }
            _ => None,
        }
    }
}
