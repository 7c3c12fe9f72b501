use super::handlers;
use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl CommandInvocation<'_> {
    /// The argument text, or `None` when the command was given no arguments.
    pub fn arg(&self) -> Option<&str> {
        Some(self.args).filter(|args| !args.is_empty())
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for completion hints.
pub fn matching_commands(prefix: &str) -> Vec<&'static Command> {
    let prefix = prefix.trim_start_matches('/').to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.starts_with(&prefix))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show keys and commands.",
        handler: handlers::core::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new chat with the current model and system prompt.",
        handler: handlers::core::handle_new,
    },
    Command {
        name: "stop",
        usage: "/stop",
        help: "Stop the response being generated.",
        handler: handlers::core::handle_stop,
    },
    Command {
        name: "copy",
        usage: "/copy",
        help: "Copy the last response to the clipboard.",
        handler: handlers::core::handle_copy,
    },
    Command {
        name: "save",
        usage: "/save [name]",
        help: "Save the chat under a name (prompts when omitted).",
        handler: handlers::io::handle_save,
    },
    Command {
        name: "load",
        usage: "/load [name]",
        help: "Load a saved chat, or pick one from the list.",
        handler: handlers::io::handle_load,
    },
    Command {
        name: "delete",
        usage: "/delete <name>",
        help: "Delete a saved chat.",
        handler: handlers::io::handle_delete,
    },
    Command {
        name: "dump",
        usage: "/dump [file]",
        help: "Write the conversation to a text file.",
        handler: handlers::io::handle_dump,
    },
    Command {
        name: "log",
        usage: "/log [file]",
        help: "Start logging to a file, or pause and resume logging.",
        handler: handlers::io::handle_log,
    },
    Command {
        name: "model",
        usage: "/model [name]",
        help: "Switch models, or pick one from the list.",
        handler: handlers::config::handle_model,
    },
    Command {
        name: "models",
        usage: "/models",
        help: "Reload the model list from the server.",
        handler: handlers::config::handle_models,
    },
    Command {
        name: "system",
        usage: "/system [text | --clear]",
        help: "Set, show or clear the system prompt.",
        handler: handlers::config::handle_system,
    },
    Command {
        name: "host",
        usage: "/host [url]",
        help: "Connect to another server; without a url, show the current one.",
        handler: handlers::config::handle_host,
    },
    Command {
        name: "markdown",
        usage: "/markdown",
        help: "Toggle markdown rendering for responses.",
        handler: handlers::config::handle_markdown,
    },
];
