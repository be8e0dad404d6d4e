//! Handlebars rendering for user-supplied message templates.
//!
//! Templates see the whole plugin bundle as context:
//!
//! ```text
//! {{#success build.status}}:tada:{{else}}:boom:{{/success}} {{repo.owner}}/{{repo.name}}
//! {{truncate build.commit 8}} by {{build.author.username}}: {{build.message.title}}
//! started {{datetime build.started "%H:%M"}}, took {{since build.started}}
//! {{regexReplace "^refs/heads/" build.ref ""}}
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, Output,
    RenderContext, RenderErrorReason, Renderable,
};
use regex::Regex;
use serde::Serialize;

use crate::error::NotifyError;
use crate::events::BuildStatus;

handlebars_helper!(truncate: |s: str, len: u64| {
    s.chars().take(usize::try_from(len).unwrap_or(usize::MAX)).collect::<String>()
});
handlebars_helper!(uppercase: |s: str| s.to_uppercase());
handlebars_helper!(lowercase: |s: str| s.to_lowercase());
handlebars_helper!(uppercasefirst: |s: str| {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    }
});
handlebars_helper!(urlencode: |s: str| {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>()
});
handlebars_helper!(datetime: |ts: i64, fmt: str| format_timestamp(ts, fmt).unwrap_or_default());
handlebars_helper!(since: |ts: i64| format_duration(Utc::now().timestamp().saturating_sub(ts)));
handlebars_helper!(duration: |start: i64, end: i64| format_duration(end.saturating_sub(start)));

/// `{{regexReplace pattern input replacement}}`, replacing every match.
/// The replacement may reference groups as `$1` or `${name}`.
fn regex_replace_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let pattern = str_param(h, "regexReplace", 0)?;
    let input = str_param(h, "regexReplace", 1)?;
    let replacement = str_param(h, "regexReplace", 2)?;

    let re = Regex::new(pattern)
        .map_err(|e| RenderErrorReason::Other(format!("regexReplace: invalid pattern: {e}")))?;

    out.write(&re.replace_all(input, replacement))?;
    Ok(())
}

fn str_param<'a>(
    h: &'a Helper,
    helper: &str,
    idx: usize,
) -> Result<&'a str, RenderErrorReason> {
    h.param(idx)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| RenderErrorReason::Other(format!("{helper}: string param {idx} is required")))
}

/// Block helper rendering its body when the status argument matches,
/// and its `{{else}}` branch otherwise.
struct StatusBlock(fn(&BuildStatus) -> bool);

impl HelperDef for StatusBlock {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let status = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .map(BuildStatus::from)
            .unwrap_or_default();

        let branch = if (self.0)(&status) {
            h.template()
        } else {
            h.inverse()
        };

        match branch {
            Some(template) => template.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

/// Template engine with the CI helpers registered.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Slack mrkdwn, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(false);

        handlebars.register_helper("truncate", Box::new(truncate));
        handlebars.register_helper("uppercase", Box::new(uppercase));
        handlebars.register_helper("lowercase", Box::new(lowercase));
        handlebars.register_helper("uppercasefirst", Box::new(uppercasefirst));
        handlebars.register_helper("urlencode", Box::new(urlencode));
        handlebars.register_helper("datetime", Box::new(datetime));
        handlebars.register_helper("since", Box::new(since));
        handlebars.register_helper("duration", Box::new(duration));
        handlebars.register_helper("regexReplace", Box::new(regex_replace_helper));
        handlebars.register_helper("success", Box::new(StatusBlock(BuildStatus::is_success)));
        handlebars.register_helper("failure", Box::new(StatusBlock(BuildStatus::is_failure)));

        Self { handlebars }
    }

    /// Render a template string, trimming surrounding whitespace from the output.
    ///
    /// # Errors
    /// Returns [`NotifyError::Template`] on invalid syntax or a failing helper.
    pub fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String, NotifyError> {
        let rendered = self.handlebars.render_template(template, context)?;
        Ok(rendered.trim().to_string())
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Format unix seconds with a strftime pattern. `None` for out-of-range
/// timestamps or invalid patterns.
fn format_timestamp(ts: i64, fmt: &str) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(ts, 0)?;
    let mut out = String::new();
    write!(out, "{}", dt.format(fmt)).ok()?;
    Some(out)
}

/// Format seconds into a human-readable duration.
fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 {
            format!("{mins}m")
        } else {
            format!("{mins}m {remaining_secs}s")
        }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h {mins}m")
        }
    }
}
