//! build-notify - post a CI build status to Slack.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use notify::cli::Cli;
use notify::SlackWebhook;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = match Cli::load_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(clap_err) => clap_err.exit(),
            Err(err) => return Err(err),
        },
    };

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let plugin = cli.into_plugin();
    if plugin.config.webhook.is_empty() {
        bail!("Missing webhook URL (set PLUGIN_WEBHOOK or SLACK_WEBHOOK)");
    }

    debug!(
        repo = %plugin.repo.full_name(),
        build = plugin.build.number,
        event = %plugin.build.event,
        status = %plugin.build.status,
        custom_template = plugin.config.template.is_some(),
        "Plugin configured"
    );

    let sender =
        SlackWebhook::new(plugin.config.webhook.clone()).context("Failed to create webhook client")?;

    plugin
        .exec(&sender)
        .await
        .context("Failed to send build notification")?;

    info!("Done");
    Ok(())
}
