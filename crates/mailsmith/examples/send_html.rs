//! Example: compose an HTML message and store it for review
//!
//! Reads the account from a JSON file when one is given, otherwise uses a
//! placeholder account. The message is sent in store mode, so nothing leaves
//! the machine: the rendered HTML lands in a temporary directory.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=mailsmith=debug cargo run --package mailsmith --example send_html -- account.json
//! ```
//!
//! `account.json` uses the option names as keys:
//!
//! ```json
//! {
//!   "server-address": "smtp.example.com",
//!   "port": 587,
//!   "user": "bot@example.com",
//!   "pass": "secret",
//!   "sender-name": "Example Bot",
//!   "sender-address": "bot@example.com"
//! }
//! ```

use std::env;

use anyhow::Context;
use mailsmith::mode::STORE_PATH;
use mailsmith::{Account, AccountOptions, Attachment, Message, ModeConfig, SendMode};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailsmith=debug,mailsmith_smtp=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options: AccountOptions = match env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading account file {path}"))?;
            serde_json::from_str(&json).context("parsing account options")?
        }
        None => AccountOptions {
            server_address: "smtp.example.com".into(),
            port: 587,
            sender_name: "Example Bot".into(),
            sender_address: "bot@example.com".into(),
            ..AccountOptions::default()
        },
    };
    let account = Account::new(options);
    info!(?account, "account loaded");

    let store = tempfile::tempdir().context("creating store directory")?;

    let mut message = Message::with_account(account);
    message
        .set_subject("Monthly summary")
        .set_priority(1)
        .insert("<h1>Monthly summary</h1>")
        .insert("<p>All systems nominal.</p>");
    message.add_to("team@example.com", Some("Team"));
    message.add_cc("manager@example.com", None);
    message.add_attachment(Attachment::bytes("summary.csv", "metric,value\nuptime,99.99\n"));
    message.add_after_send(|m| info!(subject = m.subject(), "after-send callback"));
    message.set_mode(
        SendMode::TestStore,
        ModeConfig::new().with(STORE_PATH, store.path().to_path_buf()),
    );

    message.send().context("storing message")?;

    for entry in walk(store.path())? {
        println!("stored {}", entry.display());
    }
    // Keep the files around for inspection.
    let kept = store.keep();
    println!("store directory: {}", kept.display());
    Ok(())
}

fn walk(dir: &std::path::Path) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(walk(&path)?);
        } else {
            files.push(path);
        }
    }
    Ok(files)
}
