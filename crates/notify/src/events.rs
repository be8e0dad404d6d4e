//! Build event types supplied by the CI system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of commit hash characters shown in messages.
pub const SHORT_COMMIT_LEN: usize = 8;

/// Repository the build belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub owner: String,
    pub name: String,
    pub link: String,
}

impl Repo {
    /// `owner/name` slug.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Final (or current) status of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    Success,
    Failure,
    Error,
    Killed,
    /// Any status the CI reports that has no dedicated styling (`pending`, `running`, ...)
    Other(String),
}

impl BuildStatus {
    /// Get the wire name for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Killed => "killed",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure, error and killed builds are all reported as failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure | Self::Error | Self::Killed)
    }
}

impl Default for BuildStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for BuildStatus {
    fn from(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "error" => Self::Error,
            "killed" => Self::Killed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for BuildStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        match status {
            BuildStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commit author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Commit message split into a title line and the remaining body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct CommitMessage {
    pub text: String,
    pub title: String,
    pub body: String,
}

impl CommitMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let (title, body) = match text.split_once('\n') {
            Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
            None => (text.trim().to_string(), String::new()),
        };

        Self { text, title, body }
    }
}

impl From<String> for CommitMessage {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for CommitMessage {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Snapshot of one CI run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Event that triggered the build (`push`, `pull_request`, `tag`, `promote`, `rollback`)
    pub event: String,
    pub number: u64,
    /// Parent build number for promotions and rollbacks
    pub parent: u64,
    pub commit: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub branch: String,
    pub tag: String,
    pub pull: String,
    /// Environment a promotion or rollback targets
    pub deploy_to: String,
    pub status: BuildStatus,
    pub author: Author,
    pub message: CommitMessage,
    pub link: String,
    pub started: i64,
    pub created: i64,
}

impl Build {
    /// Commit hash clamped to [`SHORT_COMMIT_LEN`] characters.
    #[must_use]
    pub fn short_commit(&self) -> &str {
        match self.commit.char_indices().nth(SHORT_COMMIT_LEN) {
            Some((idx, _)) => &self.commit[..idx],
            None => &self.commit,
        }
    }
}

/// The pipeline step that is sending the notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub started: i64,
}
