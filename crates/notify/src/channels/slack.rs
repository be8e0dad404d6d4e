//! Slack incoming-webhook channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::NotificationSender;
use crate::error::NotifyError;

/// Default timeout for webhook requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Attachment fields Slack should render as mrkdwn.
const MRKDWN_FIELDS: [&str; 2] = ["text", "fallback"];

/// Slack incoming-webhook sender.
#[derive(Clone)]
pub struct SlackWebhook {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackWebhook {
    /// Create a sender posting to the given webhook URL.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

#[async_trait]
impl NotificationSender for SlackWebhook {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, payload: &WebhookPayload) -> Result<(), NotifyError> {
        debug!(
            channel = "slack",
            recipient = payload.channel.as_deref().unwrap_or("<default>"),
            "Posting to webhook"
        );

        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "slack", status = %status, "Webhook accepted payload");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "slack",
                status = %status,
                body = %body,
                "Slack webhook request failed"
            );

            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// =============================================================================
// Slack API types
// =============================================================================

/// Incoming-webhook message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    /// `#channel` or `@user`; omitted to post to the webhook's default channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// `"1"` to linkify mentions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_names: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Colored message attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub color: String,
    pub fallback: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub mrkdwn_in: Vec<String>,
}

impl Attachment {
    /// Create an attachment with `text` and `fallback` rendered as mrkdwn.
    #[must_use]
    pub fn new(color: String, fallback: String, text: String) -> Self {
        Self {
            color,
            fallback,
            text,
            image_url: None,
            mrkdwn_in: MRKDWN_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_omits_unset_fields() {
        let payload = WebhookPayload {
            attachments: vec![Attachment::new(
                "good".to_string(),
                "fb".to_string(),
                "txt".to_string(),
            )],
            ..WebhookPayload::default()
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "attachments": [{
                    "color": "good",
                    "fallback": "fb",
                    "text": "txt",
                    "mrkdwn_in": ["text", "fallback"],
                }]
            })
        );
    }

    #[test]
    fn test_payload_full() {
        let mut attachment =
            Attachment::new("danger".to_string(), "fb".to_string(), "txt".to_string());
        attachment.image_url = Some("https://img/x.png".to_string());

        let payload = WebhookPayload {
            username: Some("drone".to_string()),
            icon_url: Some("https://img/icon.png".to_string()),
            icon_emoji: Some(":robot_face:".to_string()),
            channel: Some("#builds".to_string()),
            link_names: Some("1".to_string()),
            attachments: vec![attachment],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["username"], "drone");
        assert_eq!(value["channel"], "#builds");
        assert_eq!(value["link_names"], "1");
        assert_eq!(value["attachments"][0]["image_url"], "https://img/x.png");
    }
}
