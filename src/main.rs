//! Zenpost - create a Zendesk ticket from the command line.
//!
//! A small manual-testing surface for the library: reads credentials from
//! the environment, sends one ticket and prints the assigned id.
//!
//! # Configuration
//!
//! Set either `ZENDESK_DSN` (format `zendesk://<username>:<token>@<subdomain>`)
//! or `ZENDESK_SUBDOMAIN`, `ZENDESK_EMAIL` and `ZENDESK_TOKEN`. A `.env` file
//! is honored.
//!
//! # Usage
//!
//! ```bash
//! zenpost "Printer on fire" ["It is actually on fire."]
//! ```

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use zenpost::config::Config;
use zenpost::message::ChatMessage;
use zenpost::options::ZendeskOptions;
use zenpost::transport::ZendeskTransport;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zenpost=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut args = std::env::args().skip(1);
    let subject = match args.next() {
        Some(subject) => subject,
        None => bail!("usage: zenpost <subject> [description]"),
    };
    let description = args.next();

    let config = match std::env::var("ZENDESK_DSN") {
        Ok(dsn) => Config::from_dsn(&dsn).context("Failed to parse ZENDESK_DSN")?,
        Err(_) => Config::from_env().context("Failed to load configuration")?,
    };

    tracing::debug!(subdomain = %config.subdomain, "Configuration loaded");

    let transport = ZendeskTransport::new(&config).context("Failed to create transport")?;

    let mut options = ZendeskOptions::new().subject(&subject);
    if let Some(description) = description {
        options = options.text(description);
    }

    let sent = transport
        .send(ChatMessage::new(subject).with_options(options).into())
        .await
        .context("Failed to create Zendesk ticket")?;

    println!("{}", sent.message_id());

    Ok(())
}
