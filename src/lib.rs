//! llm-chat is a terminal chat client for local Ollama-compatible model servers.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the wire payloads of the model server and the model
//!   directory client.
//! - [`core`] owns the streaming response reader, the conversation session,
//!   the session store, configuration, and the controller state ([`core::app`]).
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`commands`] implements slash-command parsing and execution.
//! - [`utils`] holds small helpers (URLs, clipboard, scrolling, logging).
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
