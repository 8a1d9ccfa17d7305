//! rss-relay: forwards new entries of one feed to one Telegram chat.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ entries ┌───────────┐ oldest unseen ┌───────────┐
//! │ source/   │ ──────► │ filter.rs │ ────────────► │ notify/   │
//! │ (HTTP)    │         └───────────┘               │ (Telegram)│
//! └───────────┘               ▲                     └───────────┘
//!                             │ known ids                 │ ok
//!                       ┌───────────┐   save       ┌───────────┐
//!                       │ store.rs  │ ◄─────────── │  poll.rs  │
//!                       └───────────┘              └───────────┘
//! ```
//!
//! * **`source/`**: the `FeedSource` trait, the `Entry` type and id
//!   extraction, plus the HTTP RSS/Atom implementation.
//! * **`filter`**: picks the one entry to relay this cycle.
//! * **`notify/`**: MarkdownV2 escaping and the Telegram transport.
//! * **`store`**: the JSON file of already-relayed ids.
//! * **`poll`**: one cycle at a time, forever, with failures isolated.
//! * **`main`**: reads config, sets up logging, wires everything together.

mod config;
mod error;
mod filter;
mod logging;
mod notify;
mod poll;
mod source;
mod store;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use config::Config;
use notify::TelegramNotifier;
use poll::PollLoop;
use source::RssSource;
use store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -- configuration -------------------------------------------------------
    let config_path = Config::default_path();
    let config = Config::load_with_env(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    logging::init(&config.logging);
    info!(
        feed = %config.feed.url,
        chat_id = %config.telegram.chat_id,
        store = %config.store.path.display(),
        "rss-relay {} starting",
        env!("CARGO_PKG_VERSION")
    );

    // -- collaborators -------------------------------------------------------
    let source = RssSource::new(
        &config.feed.url,
        "feed",
        Duration::from_secs(config.feed.timeout_secs),
        &config.feed.user_agent,
    )?;
    let notifier = TelegramNotifier::new(
        &config.telegram.api_root,
        &config.telegram.bot_token,
        &config.telegram.chat_id,
    )?;
    let store = JsonFileStore::new(&config.store.path);

    // A corrupt store stops startup instead of wiping history.
    let poll_loop = PollLoop::new(source, notifier, store, config.poll.interval())
        .context("loading sent ids")?;

    // -- run until Ctrl-C ----------------------------------------------------
    poll_loop
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
