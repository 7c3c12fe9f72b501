use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model selected most recently; preferred on the next start when the
    /// server still lists it.
    pub last_model: Option<String>,
    /// Enable markdown rendering in the chat area
    pub markdown: Option<bool>,
    /// Override for the session store file
    pub sessions_file: Option<PathBuf>,
}

impl Config {
    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    /// Session store location, honoring the `sessions_file` override.
    pub fn sessions_path(&self) -> Option<PathBuf> {
        self.sessions_file
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("sessions.json")))
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "llm-chat", "llm-chat")
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.local/share/llm-chat/sessions.json` → `~/.local/share/llm-chat/sessions.json`
/// - Windows: `C:\\Users\\user\\AppData\\Roaming\\llm-chat` → `C:\\Users\\user\\AppData\\Roaming\\llm-chat`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
