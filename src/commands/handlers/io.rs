use super::usage_status;
use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;
use crate::core::app::chats::default_dump_name;
use crate::core::app::App;

const USAGE_LOG: &str = "Usage: /log [filename]";
const USAGE_DELETE: &str = "Usage: /delete <name>";

pub(crate) fn handle_save(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(name) = invocation.arg() else {
        // The command line itself is not a draft worth keeping
        app.ui.clear_input();
        app.open_save_prompt();
        return CommandResult::Continue;
    };
    if let Err(err) = app.save_session(name) {
        app.set_status(err.to_string());
    }
    CommandResult::Continue
}

pub(crate) fn handle_load(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(name) = invocation.arg() else {
        return CommandResult::OpenSessionPicker;
    };
    if let Err(err) = app.load_session(name) {
        app.set_status(err.to_string());
    }
    CommandResult::Continue
}

pub(crate) fn handle_delete(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(name) = invocation.arg() else {
        return usage_status(app, USAGE_DELETE);
    };
    if let Err(err) = app.delete_session(name) {
        app.set_status(err.to_string());
    }
    CommandResult::Continue
}

pub(crate) fn handle_dump(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let filename = invocation
        .arg()
        .map(str::to_string)
        .unwrap_or_else(default_dump_name);
    match app.dump_transcript(&filename) {
        Ok(()) => app.set_status(format!("Dumped: {filename}")),
        Err(err) => app.set_status(format!("Dump error: {err}")),
    }
    CommandResult::Continue
}

pub(crate) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let result = match invocation.args.split_whitespace().count() {
        0 => app.logging.toggle_logging(),
        1 => app.logging.set_log_file(invocation.args.to_string()),
        _ => return usage_status(app, USAGE_LOG),
    };
    match result {
        Ok(message) => app.set_status(message),
        Err(err) => app.set_status(format!("Log error: {err}")),
    }
    CommandResult::Continue
}
