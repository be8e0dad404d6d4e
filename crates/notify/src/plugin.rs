//! Message rendering and delivery for a single build event.

use serde::Serialize;
use tracing::{debug, info};

use crate::channels::slack::{Attachment, WebhookPayload};
use crate::channels::NotificationSender;
use crate::config::Config;
use crate::error::NotifyError;
use crate::events::{Build, Job, Repo};
use crate::message::{build_recipient, compose_body, compose_fallback, select_color};
use crate::template::TemplateEngine;

/// Everything known about one invocation. Also the context handed to
/// user templates, so field names here are part of the template surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plugin {
    pub repo: Repo,
    pub build: Build,
    pub config: Config,
    pub job: Job,
}

/// Attachment content after template and default rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub color: String,
    pub text: String,
    pub fallback: String,
}

impl Plugin {
    /// Render color, body and fallback text.
    ///
    /// A configured template replaces the default body, and a configured
    /// fallback template replaces the default fallback, independently.
    ///
    /// # Errors
    /// Returns [`NotifyError::Template`] if either template fails to render.
    pub fn render(&self) -> Result<RenderedMessage, NotifyError> {
        let engine = TemplateEngine::new();

        let color = non_empty(self.config.color.as_ref())
            .unwrap_or_else(|| select_color(&self.build.status))
            .to_string();

        let fallback = match non_empty(self.config.fallback.as_ref()) {
            Some(template) => engine.render(template, self)?,
            None => compose_fallback(&self.repo, &self.build),
        };

        let text = match non_empty(self.config.template.as_ref()) {
            Some(template) => engine.render(template, self)?,
            None => compose_body(&self.repo, &self.build, &self.config),
        };

        Ok(RenderedMessage {
            color,
            text,
            fallback,
        })
    }

    /// Build the complete webhook payload.
    ///
    /// # Errors
    /// Returns [`NotifyError::Template`] if rendering fails.
    pub fn payload(&self) -> Result<WebhookPayload, NotifyError> {
        let RenderedMessage {
            color,
            text,
            fallback,
        } = self.render()?;

        let mut attachment = Attachment::new(color, fallback, text);
        attachment.image_url = owned(self.config.image_url.as_ref());

        Ok(WebhookPayload {
            username: owned(self.config.username.as_ref()),
            icon_url: owned(self.config.icon_url.as_ref()),
            icon_emoji: owned(self.config.icon_emoji.as_ref()),
            channel: build_recipient(&self.config),
            link_names: self.config.link_names.then(|| "1".to_string()),
            attachments: vec![attachment],
        })
    }

    /// Render the notification and hand it to `sender`.
    ///
    /// # Errors
    /// Template and delivery errors are returned unchanged; nothing is retried.
    pub async fn exec(&self, sender: &dyn NotificationSender) -> Result<(), NotifyError> {
        let payload = self.payload()?;

        debug!(
            channel = sender.name(),
            color = %payload.attachments[0].color,
            "Rendered notification"
        );

        sender.send(&payload).await?;

        info!(
            channel = sender.name(),
            repo = %self.repo.full_name(),
            build = self.build.number,
            status = %self.build.status,
            "Notification sent"
        );
        Ok(())
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn owned(value: Option<&String>) -> Option<String> {
    non_empty(value).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::MockNotificationSender;
    use crate::config::Recipient;
    use crate::events::{Author, BuildStatus, CommitMessage};

    fn plugin() -> Plugin {
        Plugin {
            repo: Repo {
                owner: "acme".to_string(),
                name: "api".to_string(),
                link: "https://github.com/acme/api".to_string(),
            },
            build: Build {
                event: "push".to_string(),
                number: 7,
                commit: "0123456789abcdef".to_string(),
                branch: "main".to_string(),
                status: BuildStatus::Success,
                author: Author {
                    username: "alice".to_string(),
                    ..Author::default()
                },
                message: CommitMessage::new("Add health check\n\nPart of ops work"),
                link: "https://ci.example.com/acme/api/7".to_string(),
                ..Build::default()
            },
            config: Config::new("https://hooks.slack.com/services/T/B/X"),
            job: Job::default(),
        }
    }

    #[test]
    fn test_render_defaults() {
        let rendered = plugin().render().unwrap();
        assert_eq!(rendered.color, "good");
        assert_eq!(rendered.fallback, "success acme/api#01234567 (main) by alice");
        assert!(rendered.text.starts_with("*:white_check_mark: Push SUCCESS*"));
    }

    #[test]
    fn test_color_override() {
        let mut p = plugin();
        p.config.color = Some("#439FE0".to_string());
        assert_eq!(p.render().unwrap().color, "#439FE0");

        p.config.color = Some(String::new());
        assert_eq!(p.render().unwrap().color, "good");
    }

    #[test]
    fn test_custom_template_replaces_body() {
        let mut p = plugin();
        p.config.template = Some(
            "{{repo.owner}}/{{repo.name}} {{build.message.title}} by {{build.author.username}}\n"
                .to_string(),
        );

        let rendered = p.render().unwrap();
        assert_eq!(rendered.text, "acme/api Add health check by alice");
        assert!(!rendered.text.contains("Repo:"));
        // fallback keeps its own default
        assert_eq!(rendered.fallback, "success acme/api#01234567 (main) by alice");
    }

    #[test]
    fn test_custom_fallback_is_independent() {
        let mut p = plugin();
        p.config.fallback = Some("{{uppercase build.status}} #{{build.number}}".to_string());

        let rendered = p.render().unwrap();
        assert_eq!(rendered.fallback, "SUCCESS #7");
        assert!(rendered.text.contains("Build #7 (01234567) by alice"));
    }

    #[test]
    fn test_templates_cannot_see_webhook() {
        let mut p = plugin();
        p.config.template = Some("[{{config.webhook}}]".to_string());
        assert_eq!(p.render().unwrap().text, "[]");
    }

    #[test]
    fn test_payload_fields() {
        let mut p = plugin();
        p.config.username = Some("drone".to_string());
        p.config.icon_emoji = Some(":rocket:".to_string());
        p.config.icon_url = Some(String::new());
        p.config.image_url = Some("https://img/badge.png".to_string());
        p.config.recipient = Some(Recipient::Channel("deploys".to_string()));
        p.config.link_names = true;

        let payload = p.payload().unwrap();
        assert_eq!(payload.username.as_deref(), Some("drone"));
        assert_eq!(payload.icon_emoji.as_deref(), Some(":rocket:"));
        assert_eq!(payload.icon_url, None);
        assert_eq!(payload.channel.as_deref(), Some("#deploys"));
        assert_eq!(payload.link_names.as_deref(), Some("1"));
        assert_eq!(payload.attachments.len(), 1);
        assert_eq!(
            payload.attachments[0].image_url.as_deref(),
            Some("https://img/badge.png")
        );
        assert_eq!(payload.attachments[0].mrkdwn_in, vec!["text", "fallback"]);
    }

    #[tokio::test]
    async fn test_exec_sends_once() {
        let p = plugin();
        let expected = p.payload().unwrap();

        let mut sender = MockNotificationSender::new();
        sender.expect_name().return_const("mock");
        sender
            .expect_send()
            .withf(move |payload| *payload == expected)
            .times(1)
            .returning(|_| Ok(()));

        p.exec(&sender).await.unwrap();
    }

    #[tokio::test]
    async fn test_exec_template_error_skips_send() {
        let mut p = plugin();
        p.config.template = Some("{{#each}}".to_string());

        let mut sender = MockNotificationSender::new();
        sender.expect_name().return_const("mock");
        sender.expect_send().never();

        let err = p.exec(&sender).await.unwrap_err();
        assert!(matches!(err, NotifyError::Template(_)));
    }

    #[tokio::test]
    async fn test_exec_propagates_transport_error() {
        let p = plugin();

        let mut sender = MockNotificationSender::new();
        sender.expect_name().return_const("mock");
        sender.expect_send().times(1).returning(|_| {
            Err(NotifyError::Rejected {
                status: 500,
                body: "internal_error".to_string(),
            })
        });

        let err = p.exec(&sender).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 500, .. }));
    }
}
