//! Drive a chat session against a running backend.
//!
//! Loads `config/default.toml` (plus `RESIPLY_*` overrides), merges the
//! member's remote history, sends one message and prints the thread.
//!
//! # Usage
//!
//! ```bash
//! export RESIPLY_BACKEND__BASE_URL=http://localhost:8000/api
//! export RESIPLY_SESSION_TOKEN=...
//!
//! cargo run --example chat_session -- 42 "이번 주 저녁 식단 짜줘"
//! ```

use std::sync::Arc;

use anyhow::Result;
use resiply::checkout::format_won;
use resiply::telemetry::init_logging;
use resiply::threads::display_title;
use resiply::{ChatSession, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&settings.logging)?;

    let mut args = std::env::args().skip(1);
    let member_id = args.next().unwrap_or_else(|| "1".to_string());
    let text = args
        .next()
        .unwrap_or_else(|| "간단한 저녁 메뉴 추천해줘".to_string());

    let store = settings.open_store()?;
    let backend = settings.http_backend()?;
    let mut session = ChatSession::new(
        store,
        backend,
        settings.chat.clone(),
        settings.checkout.clone(),
    );
    session.sign_in(member_id);

    match session.refresh_remote().await {
        Ok(count) => tracing::info!(threads = count, "History merged"),
        Err(e) => tracing::warn!(error = %e, "Could not load remote history"),
    }

    let thread_id = session.create_thread();
    session.send(&thread_id, &text).await?;

    let max = settings.chat.title_max_chars;
    for thread in session.threads().threads() {
        println!("[{}] {}", thread.id, display_title(&thread.title, max));
    }

    if let Some(thread) = session.threads().get(&thread_id) {
        println!();
        for message in &thread.messages {
            println!("{:?}: {}", message.role, message.text());
        }
    }

    let preview = session.cart_preview();
    println!(
        "\ncart: {} items, payable {}원",
        session.cart().cart_count(),
        format_won(preview.payable)
    );

    Ok(())
}
