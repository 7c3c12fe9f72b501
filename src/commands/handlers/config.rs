use super::add_info;
use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;
use crate::core::app::App;

const CLEAR_FLAG: &str = "--clear";

pub(crate) fn handle_model(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(name) = invocation.arg() else {
        return CommandResult::OpenModelPicker;
    };
    if let Err(err) = app.set_model(name) {
        app.set_status(err);
    }
    CommandResult::Continue
}

pub(crate) fn handle_models(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.set_status(format!("Loading models from {}", app.host));
    CommandResult::RefreshModels
}

pub(crate) fn handle_system(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(text) = invocation.arg() else {
        let current = app.session().system_prompt.clone();
        if current.is_empty() {
            app.set_status("No system prompt set");
            return CommandResult::Continue;
        }
        return add_info(app, format!("System prompt:\n\n{current}"));
    };
    let text = if text == CLEAR_FLAG { "" } else { text };
    if let Err(err) = app.set_system_prompt(text) {
        app.set_status(err.to_string());
    }
    CommandResult::Continue
}

pub(crate) fn handle_host(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(host) = invocation.arg() else {
        app.set_status(format!("Host: {}", app.host));
        return CommandResult::Continue;
    };
    if app.is_streaming() {
        app.set_status("Wait for the response to finish before switching servers");
        return CommandResult::Continue;
    }
    match app.set_host(host) {
        Ok(()) => CommandResult::RefreshModels,
        Err(err) => {
            app.set_status(err);
            CommandResult::Continue
        }
    }
}

pub(crate) fn handle_markdown(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.toggle_markdown();
    CommandResult::Continue
}
