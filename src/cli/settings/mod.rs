//! Settings management for CLI set/unset commands.
//!
//! Each key has a [`SettingHandler`]. Config-backed keys (`default-model`,
//! `markdown`) go through [`Config::mutate`]; the reserved store keys
//! (`host-address`, `system-prompt`) are written to the session store.

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;
use crate::core::store::SessionStore;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    pub config: &'a Config,
    pub store: &'a SessionStore,
}

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the arguments given after the key.
    ///
    /// Returns a success message to display.
    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Clear the value.
    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `llm-chat set` output.
    fn format(&self, ctx: &SetContext<'_>) -> String;
}
