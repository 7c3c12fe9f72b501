//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};

use ratatui::style::Style;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::api::models::{fetch_models, select_model};
use crate::core::chat_stream::{ChatStreamService, StreamMessage, StreamParams};
use crate::core::config::data::Config;
use crate::core::session::{Conversation, Session};
use crate::core::store::SessionStore;
use crate::ui::chat_loop::setup::{build_http_client, open_session_store, resolve_startup_host};
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Theme;

pub async fn run_say(
    prompt: Vec<String>,
    model: Option<String>,
    host: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let Some(prompt) = join_prompt(&prompt) else {
        eprintln!("Usage: llm-chat say <prompt>");
        std::process::exit(1);
    };

    let config = Config::load()?;
    let store = open_session_store(&config)?;
    let host = resolve_startup_host(host.as_deref(), &store);
    let client = build_http_client()?;

    let requested = model
        .filter(|model| !model.trim().is_empty())
        .or(config.last_model.clone());
    let listing = fetch_models(&client, &host).await?;
    let model = select_model(&listing.models, requested.as_deref())
        .ok_or("No models available. Pull one with 'ollama pull <model>'.")?;

    let conversation = Conversation::new(Session::new(model, stored_system_prompt(&store)));
    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(StreamParams {
        client,
        host,
        request: conversation.request_for(prompt),
        cancel_token: CancellationToken::new(),
        stream_id: 0,
    });
    // The spawned task holds the only sender left, so the channel closes with it
    drop(stream_service);

    let markdown = config.markdown_enabled();
    let mut full_response = String::new();
    while let Some((message, _)) = rx.recv().await {
        match message {
            StreamMessage::Token(event) => {
                full_response.push_str(&event.text);
                if !markdown {
                    print!("{}", event.text);
                    io::stdout().flush()?;
                }
                if event.is_final {
                    break;
                }
            }
            StreamMessage::Failed(err) => {
                eprintln!("\n\n❌ Error: {err}");
                std::process::exit(1);
            }
            StreamMessage::Cancelled => break,
        }
    }

    if markdown {
        let theme = Theme::dark_default();
        for line in render_markdown(&full_response, &theme, Style::default()) {
            println!("{line}");
        }
    } else {
        println!();
    }

    Ok(())
}

fn join_prompt(words: &[String]) -> Option<String> {
    let prompt = words.join(" ");
    if prompt.trim().is_empty() {
        None
    } else {
        Some(prompt)
    }
}

fn stored_system_prompt(store: &SessionStore) -> String {
    match store.system_prompt() {
        Ok(prompt) => prompt.unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "Could not read the stored system prompt");
            String::new()
        }
    }
}
