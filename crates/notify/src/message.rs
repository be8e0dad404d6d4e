//! Default message composition for build notifications.
//!
//! The body is four lines of Slack mrkdwn:
//!
//! ```text
//! *:x: Deploy Prod FAILURE*
//! Repo: `acme/api` (main)
//! Build #42 (abcdef12) by bob
//! <https://ci.example.com/acme/api/42|Drone CI>
//! ```

use url::Url;

use crate::config::{Config, Recipient};
use crate::events::{Build, BuildStatus, Repo};

/// Label used for links back to the CI run.
const CI_LINK_LABEL: &str = "Drone CI";

/// Attachment color for a build status.
#[must_use]
pub fn select_color(status: &BuildStatus) -> &'static str {
    if status.is_success() {
        "good"
    } else if status.is_failure() {
        "danger"
    } else {
        "warning"
    }
}

/// Emoji shown in front of the title line.
#[must_use]
pub fn select_icon(status: &BuildStatus) -> &'static str {
    if status.is_success() {
        ":white_check_mark:"
    } else if status.is_failure() {
        ":x:"
    } else {
        ":warning:"
    }
}

/// One-line plain text summary for clients that cannot render attachments.
#[must_use]
pub fn compose_fallback(repo: &Repo, build: &Build) -> String {
    format!(
        "{} {}/{}#{} ({}) by {}",
        build.status,
        repo.owner,
        repo.name,
        build.short_commit(),
        build.branch,
        build.author
    )
}

/// Default four-line message body.
#[must_use]
pub fn compose_body(repo: &Repo, build: &Build, config: &Config) -> String {
    let title = format!(
        "*{} {} {}*",
        select_icon(&build.status),
        compose_title(build),
        build.status.as_str().to_uppercase()
    );
    let repo_line = format!("Repo: `{}/{}` ({})", repo.owner, repo.name, build.branch);
    let build_line = format!(
        "Build #{} ({}) by {}",
        build.number,
        build.short_commit(),
        build.author
    );

    format!(
        "{title}\n{repo_line}\n{build_line}\n{}",
        compose_footer(&build.link, config)
    )
}

/// Event description for the title line, aware of deploy targets.
#[must_use]
pub fn compose_title(build: &Build) -> String {
    let event = title_case(&build.event);

    if build.deploy_to.is_empty() {
        event
    } else if build.event == "promote" {
        format!("Deploy {}", title_case(&build.deploy_to))
    } else {
        format!("{} {event}", title_case(&build.deploy_to))
    }
}

/// Link back to the CI run, split into internal and external links when both
/// hostnames are configured.
#[must_use]
pub fn compose_footer(link: &str, config: &Config) -> String {
    match config.host_rewrite() {
        Some((internal, external)) => {
            let (internal_url, external_url) = match link_hostname(link) {
                Some(host) => (
                    replace_host(link, &host, internal),
                    replace_host(link, &host, external),
                ),
                None => (link.to_string(), link.to_string()),
            };
            format!("<{internal_url}|{CI_LINK_LABEL}> (<{external_url}|External>)")
        }
        None => format!("<{link}|{CI_LINK_LABEL}>"),
    }
}

/// Channel field for the payload, or `None` to use the webhook's default.
///
/// Prefixes are only added when missing, so `bob` and `@bob` are equivalent.
#[must_use]
pub fn build_recipient(config: &Config) -> Option<String> {
    config.recipient.as_ref().map(|recipient| match recipient {
        Recipient::User(user) => prepend("@", user),
        Recipient::Channel(channel) => prepend("#", channel),
    })
}

fn link_hostname(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(ToString::to_string)
}

/// Replace the first occurrence of `host` in `link`, ignoring ASCII case.
///
/// `Url` reports hostnames lowercased while the raw link keeps whatever case
/// the CI sent. ASCII lowercasing keeps byte offsets, so the match indexes
/// the raw link directly.
fn replace_host(link: &str, host: &str, replacement: &str) -> String {
    match link.to_ascii_lowercase().find(&host.to_ascii_lowercase()) {
        Some(start) => format!(
            "{}{replacement}{}",
            &link[..start],
            &link[start + host.len()..]
        ),
        None => link.to_string(),
    }
}

fn prepend(prefix: &str, s: &str) -> String {
    if s.starts_with(prefix) {
        s.to_string()
    } else {
        format!("{prefix}{s}")
    }
}

/// Uppercase the first letter of every word.
///
/// Any character that is neither alphanumeric nor `_` starts a new word.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }

    out
}
