use crate::core::config::data::project_dirs;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter, e.g. `llm_chat=debug`.
pub const LOG_ENV_VAR: &str = "LLM_CHAT_LOG";

/// Install a file-backed tracing subscriber when [`LOG_ENV_VAR`] is set.
///
/// The terminal is in raw mode while chatting, so diagnostics always go to
/// `<cache dir>/llm-chat.log`. Returns the log path when logging is active.
pub fn init_tracing() -> Option<PathBuf> {
    let directives = std::env::var(LOG_ENV_VAR).ok()?;
    let filter = parse_filter(&directives)?;
    let path = diagnostics_log_path()?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;
    Some(path)
}

fn parse_filter(directives: &str) -> Option<EnvFilter> {
    let directives = directives.trim();
    if directives.is_empty() {
        return None;
    }
    EnvFilter::try_new(directives).ok()
}

pub fn diagnostics_log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join("llm-chat.log"))
}
