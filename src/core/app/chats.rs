//! Chat management and settings actions shared by keybindings and commands.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::{debug, warn};

use super::{remember_model, App};
use crate::core::config::data::Config;
use crate::core::error::StoreError;
use crate::core::message::Message;
use crate::utils::clipboard::copy_to_clipboard;
use crate::utils::url::normalize_host;

impl App {
    /// Drop the transcript and continuation token, keeping model and prompt.
    pub fn new_chat(&mut self) {
        self.cancel_current_stream();
        self.conversation.reset();
        self.notices.clear();
        self.active_session_name = None;
        self.ui.auto_scroll = true;
        self.ui.scroll_offset = 0;
        self.ui.invalidate_lines();
        self.set_status("New chat");
    }

    pub fn save_session(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if self.is_streaming() {
            self.set_status("Wait for the response to finish before saving");
            return Ok(());
        }
        self.store.save(name, self.conversation.session())?;
        self.active_session_name = Some(name.to_string());
        self.set_status(format!("Saved chat '{name}'"));
        Ok(())
    }

    /// Replace the active chat with a saved one.
    ///
    /// The stored model is kept only when the server still lists it.
    pub fn load_session(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if self.is_streaming() {
            self.set_status("Wait for the response to finish before loading a chat");
            return Ok(());
        }
        let mut session = self.store.load(name)?;
        let listed = self.models.iter().any(|model| model.name == session.model);
        if session.model.is_empty() || (!self.models.is_empty() && !listed) {
            session.model = self.model().to_string();
        }

        self.conversation.replace_session(session);
        self.notices.clear();
        self.active_session_name = Some(name.to_string());
        self.ui.auto_scroll = true;
        self.ui.invalidate_lines();
        self.set_status(format!("Loaded chat '{name}'"));
        debug!(session = %name, "Loaded session into the active chat");
        Ok(())
    }

    pub fn delete_session(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        self.store.delete(name)?;
        if self.active_session_name.as_deref() == Some(name) {
            self.active_session_name = None;
        }
        self.set_status(format!("Deleted chat '{name}'"));
        Ok(())
    }

    /// Switch the model used for the next generation.
    pub fn set_model(&mut self, name: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if !self.models.is_empty() && !self.models.iter().any(|model| model.name == name) {
            return Err(format!("Model '{name}' is not installed on {}", self.host));
        }
        self.conversation.set_model(name);
        remember_model(name);
        self.set_status(format!("Model: {name}"));
        Ok(())
    }

    /// Set the system prompt for this chat and future ones. Blank clears it.
    pub fn set_system_prompt(&mut self, prompt: &str) -> Result<(), StoreError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            self.store.clear_system_prompt()?;
            self.set_status("System prompt cleared");
        } else {
            self.store.set_system_prompt(prompt)?;
            self.set_status("System prompt updated");
        }
        self.conversation.set_system_prompt(prompt);
        Ok(())
    }

    /// Point the client at another server and remember it.
    ///
    /// The caller is expected to refresh the model listing afterwards.
    pub fn set_host(&mut self, host: &str) -> Result<(), String> {
        let host = normalize_host(host).ok_or_else(|| "Host address cannot be empty".to_string())?;
        self.store
            .set_host_address(&host)
            .map_err(|err| err.to_string())?;
        debug!(host = %host, "Switched server address");
        self.host = host;
        self.set_status(format!("Host: {}", self.host));
        Ok(())
    }

    pub fn copy_last_response(&mut self) {
        let Some(text) = self
            .conversation
            .session()
            .last_assistant_text()
            .map(str::to_string)
        else {
            self.set_status("No response to copy");
            return;
        };
        match copy_to_clipboard(&text) {
            Ok(()) => self.set_status("Copied last response"),
            Err(err) => {
                warn!(error = %err, "Clipboard copy failed");
                self.set_status(format!("Copy failed: {err}"));
            }
        }
    }

    pub fn toggle_markdown(&mut self) {
        self.ui.markdown_enabled = !self.ui.markdown_enabled;
        let enabled = self.ui.markdown_enabled;
        self.ui.invalidate_lines();
        if let Err(err) = Config::mutate(move |config| {
            config.markdown = Some(enabled);
            Ok(())
        }) {
            warn!(error = %err, "Could not persist the markdown setting");
        }
        self.set_status(if enabled {
            "Markdown rendering on"
        } else {
            "Markdown rendering off"
        });
    }

    /// Write the visible conversation to a plain text file.
    pub fn dump_transcript(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let transcript = &self.conversation.session().transcript;
        if transcript.is_empty() {
            return Err("Nothing to dump: the chat is empty".into());
        }
        let mut writer = BufWriter::new(File::create(path)?);
        for message in transcript {
            write_entry(&mut writer, message)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn write_entry(writer: &mut impl Write, message: &Message) -> std::io::Result<()> {
    if message.is_user() {
        writeln!(writer, "You: {}", message.content)?;
    } else {
        writeln!(writer, "{}", message.content)?;
    }
    writeln!(writer)
}

/// File name used by `/dump` when none is given.
pub fn default_dump_name() -> String {
    format!(
        "llm-chat-{}.txt",
        chrono::Local::now().format("%Y-%m-%d-%H%M%S")
    )
}
