use super::add_info;
use crate::commands::registry::CommandInvocation;
use crate::commands::{all_commands, CommandResult};
use crate::core::app::App;

const KEY_HELP: &str = "## Keys\n\
- `Enter` send, `Alt+Enter` new line\n\
- `Esc` stop the response or close a dialog\n\
- `Ctrl+N` new chat, `Ctrl+S` save, `Ctrl+O` load (`Del` deletes in the list)\n\
- `Ctrl+P` pick a model, `Ctrl+Y` copy the last response\n\
- `PgUp`/`PgDn`, `Ctrl+Home`/`Ctrl+End` or the mouse wheel to scroll\n\
- `Ctrl+C` quit";

pub(crate) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help_md = KEY_HELP.to_string();
    help_md.push_str("\n\n## Commands\n");
    for command in all_commands() {
        help_md.push_str(&format!("- `{}` {}\n", command.usage, command.help));
    }
    add_info(app, help_md)
}

pub(crate) fn handle_new(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.new_chat();
    CommandResult::Continue
}

pub(crate) fn handle_stop(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    if !app.cancel_current_stream() {
        app.set_status("Nothing to stop");
    }
    CommandResult::Continue
}

pub(crate) fn handle_copy(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.copy_last_response();
    CommandResult::Continue
}
