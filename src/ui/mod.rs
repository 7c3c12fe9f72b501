//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that dispatches input to [`crate::commands`]
//!   and applies stream events from [`crate::core::chat_stream`].
//! - [`renderer`] and [`layout`]: frame composition.
//! - [`markdown`] and [`theme`]: turning transcript text into styled lines.
//! - [`picker`]: list selection for models and saved chats.
//!
//! This layer presents and captures interaction state; [`crate::core`] owns
//! the conversation and persistence logic.

pub mod chat_loop;
pub mod layout;
pub mod markdown;
pub mod picker;
pub mod renderer;
pub mod theme;
