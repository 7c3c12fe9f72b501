//! Registry of setting handlers.

use std::collections::HashMap;

use super::error::SettingError;
use super::handlers::{
    DefaultModelHandler, HostAddressHandler, MarkdownHandler, SystemPromptHandler,
};
use super::{SetContext, SettingHandler};
use crate::core::config::data::path_display;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `llm-chat set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        // Register handlers in display order
        registry.register(Box::new(DefaultModelHandler));
        registry.register(Box::new(MarkdownHandler));
        registry.register(Box::new(HostAddressHandler));
        registry.register(Box::new(SystemPromptHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Result<&dyn SettingHandler, SettingError> {
        self.handlers
            .get(key)
            .map(|h| h.as_ref())
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    /// Every setting with its current value, one per line.
    pub fn format_all(&self, ctx: &SetContext<'_>) -> String {
        let mut out = String::from("Current configuration:\n");
        for key in &self.display_order {
            if let Some(handler) = self.handlers.get(key) {
                out.push_str(&handler.format(ctx));
                out.push('\n');
            }
        }
        match ctx.config.sessions_path() {
            Some(path) => out.push_str(&format!("  sessions-file: {}\n", path_display(path))),
            None => out.push_str("  sessions-file: (unavailable)\n"),
        }
        out
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
