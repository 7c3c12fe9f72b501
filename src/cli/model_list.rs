//! Model listing for `llm-chat -m`.

use std::error::Error;

use crate::api::models::{fetch_models, format_size, sort_models};
use crate::core::config::data::Config;
use crate::ui::chat_loop::setup::{build_http_client, open_session_store, resolve_startup_host};

pub async fn list_models(cli_host: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    let host = resolve_startup_host(cli_host.as_deref(), &store);

    println!("🤖 Available Models at {host}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if let Some(default_model) = &config.last_model {
        println!("🎯 Default model: {default_model} (from config)");
        println!();
    }

    let client = build_http_client()?;
    let mut models = fetch_models(&client, &host).await?.models;

    if models.is_empty() {
        println!("No models found. Pull one with 'ollama pull <model>'.");
        return Ok(());
    }

    sort_models(&mut models);
    println!("Found {} models:", models.len());
    println!();
    for line in model_lines(&models) {
        println!("{line}");
    }
    println!();
    println!("💡 Start a chat with: llm-chat -m <model>");
    Ok(())
}

fn model_lines(models: &[crate::api::ModelInfo]) -> Vec<String> {
    models
        .iter()
        .map(|model| match model.size {
            Some(size) => format!("  • {} ({})", model.name, format_size(size)),
            None => format!("  • {}", model.name),
        })
        .collect()
}
