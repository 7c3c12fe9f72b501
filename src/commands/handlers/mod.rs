pub(super) mod config;
pub(super) mod core;
pub(super) mod io;

use crate::commands::CommandResult;
use crate::core::app::App;
use crate::core::message::Message;

pub(super) fn usage_status(app: &mut App, usage: &'static str) -> CommandResult {
    app.set_status(usage);
    CommandResult::Continue
}

pub(super) fn add_info(app: &mut App, content: String) -> CommandResult {
    app.add_notice(Message::app_info(content));
    CommandResult::Continue
}
