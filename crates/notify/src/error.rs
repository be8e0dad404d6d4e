//! Error types for build notifications.

use thiserror::Error;

/// Errors that can occur while rendering or delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A custom message or fallback template failed to render
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl NotifyError {
    /// Whether this error came from delivering the payload rather than rendering it.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_is_transport() {
        let err = NotifyError::Rejected {
            status: 404,
            body: "no_service".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Webhook returned 404: no_service");
    }
}
