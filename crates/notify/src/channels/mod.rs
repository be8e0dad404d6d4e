//! Notification delivery channels.

pub mod slack;

use async_trait::async_trait;

use crate::error::NotifyError;
use slack::WebhookPayload;

/// Capability for delivering a rendered payload.
///
/// Injected into [`crate::Plugin::exec`] so delivery can be replaced in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver the payload. Called exactly once per invocation.
    async fn send(&self, payload: &WebhookPayload) -> Result<(), NotifyError>;
}
