//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod model_list;
pub mod say;
pub mod sessions;
pub mod settings;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::model_list::list_models;
use crate::cli::say::run_say;
use crate::cli::sessions::list_sessions;
use crate::cli::settings::{SetContext, SettingRegistry};
use crate::core::config::data::Config;
use crate::ui::chat_loop::setup::open_session_store;
use crate::ui::chat_loop::{run_chat, ChatOptions};
use crate::utils::diagnostics::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "llm-chat")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat interface for local Ollama model servers")]
#[command(
    long_about = "llm-chat is a full-screen terminal chat interface for an Ollama-compatible \
model server. Responses stream in as they are generated, conversations continue through \
the server's context token, and chats can be saved and reopened by name.\n\n\
Server address (first match wins):\n\
  --host <URL>      Address given on the command line\n\
  host-address      Address stored with 'llm-chat set host-address <URL>' or /host\n\
  OLLAMA_HOST       Environment variable\n\
  default           http://localhost:11434\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line\n\
  Esc               Stop the response being generated\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /help             Show all commands and keyboard shortcuts\n\
  /save, /load      Save or reopen a named chat\n\
  /model, /system   Change the model or system prompt\n\n\
Diagnostics:\n\
  LLM_CHAT_LOG      Tracing filter (e.g. llm_chat=debug), written to the cache directory"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for chat, or list available models if no model specified
    #[arg(short = 'm', long, global = true, value_name = "MODEL", num_args = 0..=1, default_missing_value = "")]
    pub model: Option<String>,

    /// Model server address, e.g. http://gpu-box:11434
    #[arg(long, global = true, value_name = "URL")]
    pub host: Option<String>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single prompt and print the response without the TUI
    Say {
        /// Prompt text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List saved chats
    Sessions,
    /// Set configuration values, or show them all when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let result = match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => match args.model.as_deref() {
            // -m was provided without a value, list available models
            Some("") => list_models(args.host).await,
            _ => {
                run_chat(ChatOptions {
                    model: args.model,
                    host: args.host,
                    log: args.log,
                })
                .await
            }
        },
        Commands::Say { prompt } => run_say(prompt, args.model, args.host).await,
        Commands::Sessions => list_sessions(),
        Commands::Set { key, value } => run_set(key, value),
        Commands::Unset { key } => run_unset(key),
    };

    if let Err(err) = result {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

fn run_set(key: Option<String>, value: Vec<String>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    let ctx = SetContext {
        config: &config,
        store: &store,
    };
    let registry = SettingRegistry::new();

    let Some(key) = key else {
        print!("{}", registry.format_all(&ctx));
        return Ok(());
    };

    let outcome = registry
        .get(&key)
        .and_then(|handler| handler.set(&value, &ctx));
    match outcome {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}

fn run_unset(key: String) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    let ctx = SetContext {
        config: &config,
        store: &store,
    };
    let registry = SettingRegistry::new();

    match registry.get(&key).and_then(|handler| handler.unset(&ctx)) {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}

#[cfg(test)]
mod tests;
