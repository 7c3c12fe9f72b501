//! Setting handlers for config-backed and store-backed keys.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{
    format_bool, mutate_config, parse_bool, store_error, success_set, success_unset,
};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::utils::url::normalize_host;

/// Handler for `default-model`, the model preferred at startup.
pub struct DefaultModelHandler;

impl SettingHandler for DefaultModelHandler {
    fn key(&self) -> &'static str {
        "default-model"
    }

    fn set(&self, args: &[String], _ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let model = args.join(" ");
        if model.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set a default model, specify the model name:",
                example: "llm-chat set default-model llama3.2:latest",
            });
        }
        let message = success_set(self.key(), &model);
        mutate_config(move |config| {
            config.last_model = Some(model);
            Ok(())
        })?;
        Ok(message)
    }

    fn unset(&self, _ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(|config| {
            config.last_model = None;
            Ok(())
        })?;
        Ok(success_unset(self.key()))
    }

    fn format(&self, ctx: &SetContext<'_>) -> String {
        match &ctx.config.last_model {
            Some(model) => format!("  default-model: {model}"),
            None => "  default-model: (unset, first listed model)".to_string(),
        }
    }
}

/// Handler for `markdown`, rendering of responses as markdown.
pub struct MarkdownHandler;

impl SettingHandler for MarkdownHandler {
    fn key(&self) -> &'static str {
        "markdown"
    }

    fn set(&self, args: &[String], _ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set markdown rendering, specify on or off:",
                example: "llm-chat set markdown off",
            });
        }
        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        mutate_config(move |config| {
            config.markdown = Some(value);
            Ok(())
        })?;
        Ok(success_set(self.key(), format_bool(value)))
    }

    fn unset(&self, _ctx: &SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(|config| {
            config.markdown = None;
            Ok(())
        })?;
        Ok(format!("✅ Unset {} (will use default: on)", self.key()))
    }

    fn format(&self, ctx: &SetContext<'_>) -> String {
        match ctx.config.markdown {
            Some(value) => format!("  markdown: {}", format_bool(value)),
            None => "  markdown: (unset, default: on)".to_string(),
        }
    }
}

/// Handler for the stored `host-address`.
pub struct HostAddressHandler;

impl SettingHandler for HostAddressHandler {
    fn key(&self) -> &'static str {
        "host-address"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set the server address, specify a host or URL:",
                example: "llm-chat set host-address http://gpu-box:11434",
            });
        }
        let input = args.join(" ");
        let host = normalize_host(&input).ok_or(SettingError::InvalidHost(input))?;
        ctx.store.set_host_address(&host).map_err(store_error)?;
        Ok(success_set(self.key(), &host))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        ctx.store.clear_host_address().map_err(store_error)?;
        Ok(success_unset(self.key()))
    }

    fn format(&self, ctx: &SetContext<'_>) -> String {
        match ctx.store.host_address() {
            Ok(Some(host)) => format!("  host-address: {host}"),
            Ok(None) => "  host-address: (unset, OLLAMA_HOST or http://localhost:11434)".to_string(),
            Err(err) => format!("  host-address: (unreadable: {err})"),
        }
    }
}

/// Handler for the stored `system-prompt`.
pub struct SystemPromptHandler;

impl SettingHandler for SystemPromptHandler {
    fn key(&self) -> &'static str {
        "system-prompt"
    }

    fn set(&self, args: &[String], ctx: &SetContext<'_>) -> Result<String, SettingError> {
        let prompt = args.join(" ");
        if prompt.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set a system prompt, give its text:",
                example: "llm-chat set system-prompt You answer in one sentence.",
            });
        }
        ctx.store
            .set_system_prompt(prompt.trim())
            .map_err(store_error)?;
        Ok(success_set(self.key(), prompt.trim()))
    }

    fn unset(&self, ctx: &SetContext<'_>) -> Result<String, SettingError> {
        ctx.store.clear_system_prompt().map_err(store_error)?;
        Ok(success_unset(self.key()))
    }

    fn format(&self, ctx: &SetContext<'_>) -> String {
        match ctx.store.system_prompt() {
            Ok(Some(prompt)) => format!("  system-prompt: {prompt}"),
            Ok(None) => "  system-prompt: (unset)".to_string(),
            Err(err) => format!("  system-prompt: (unreadable: {err})"),
        }
    }
}
