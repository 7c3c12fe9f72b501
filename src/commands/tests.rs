use super::*;
use crate::core::app::{NamePromptKind, UiMode};
use crate::utils::test_utils::{create_test_app, final_token, token};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn plain_text_is_processed_as_message() {
    let mut app = create_test_app();
    assert_eq!(
        process_input(&mut app, "hello there"),
        CommandResult::ProcessAsMessage("hello there".to_string())
    );
}

#[test]
fn unknown_slash_command_is_sent_as_message() {
    let mut app = create_test_app();
    assert_eq!(
        process_input(&mut app, "/usr/bin is a path"),
        CommandResult::ProcessAsMessage("/usr/bin is a path".to_string())
    );
}

#[test]
fn command_names_are_case_insensitive() {
    let mut app = create_test_app();
    assert_eq!(process_input(&mut app, "/MODEL"), CommandResult::OpenModelPicker);
    assert_eq!(process_input(&mut app, "/load"), CommandResult::OpenSessionPicker);
}

#[test]
fn help_lists_every_command() {
    let mut app = create_test_app();
    assert_eq!(process_input(&mut app, "/help"), CommandResult::Continue);
    let help = app
        .display_messages()
        .last()
        .map(|message| message.content.clone())
        .unwrap_or_default();
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.name);
    }
    // Help is never part of the saved chat
    assert!(app.session().transcript.is_empty());
}

#[test]
fn save_load_and_delete_commands() {
    let mut app = create_test_app();
    let params = app.submit_prompt("q".to_string()).expect("params");
    app.handle_stream_message(final_token("a", json!([3])), params.stream_id);

    process_input(&mut app, "/save  my chat ");
    assert_eq!(app.store.list().expect("list"), vec!["my chat".to_string()]);

    process_input(&mut app, "/new");
    assert!(app.session().transcript.is_empty());

    process_input(&mut app, "/load my chat");
    assert_eq!(app.session().transcript.len(), 2);

    process_input(&mut app, "/delete my chat");
    assert!(app.store.list().expect("list").is_empty());

    process_input(&mut app, "/delete my chat");
    assert!(app.ui.status.as_deref().unwrap_or("").contains("Deleted"));
}

#[test]
fn save_without_name_opens_prompt() {
    let mut app = create_test_app();
    process_input(&mut app, "/save");
    assert!(matches!(
        app.ui.mode,
        UiMode::NamePrompt(NamePromptKind::SaveSession)
    ));
}

#[test]
fn save_prompt_does_not_keep_command_text() {
    let mut app = create_test_app();
    app.ui.set_input_text("/save");
    process_input(&mut app, "/save");
    assert_eq!(app.ui.input_text(), "");

    app.close_overlay();
    assert!(app.ui.in_typing_mode());
    assert_eq!(app.ui.input_text(), "");
}

#[test]
fn save_under_reserved_name_reports_error() {
    let mut app = create_test_app();
    process_input(&mut app, "/save system-prompt");
    assert!(app.store.list().expect("list").is_empty());
    assert!(app.ui.status.as_deref().unwrap_or("").contains("reserved"));
}

#[test]
fn load_missing_chat_reports_not_found() {
    let mut app = create_test_app();
    process_input(&mut app, "/load nope");
    assert!(app
        .ui
        .status
        .as_deref()
        .unwrap_or("")
        .contains("No saved chat named 'nope'"));
}

#[test]
fn stop_command_cancels_generation() {
    let mut app = create_test_app();
    let params = app.submit_prompt("q".to_string()).expect("params");
    app.handle_stream_message(token("par"), params.stream_id);

    process_input(&mut app, "/stop");
    assert!(!app.is_streaming());
    assert!(params.cancel_token.is_cancelled());
}

#[test]
fn model_command_switches_listed_model() {
    let mut app = create_test_app();
    process_input(&mut app, "/model other-model");
    assert_eq!(app.model(), "other-model");

    process_input(&mut app, "/model not-installed");
    assert_eq!(app.model(), "other-model");
}

#[test]
fn system_command_sets_shows_and_clears() {
    let mut app = create_test_app();
    process_input(&mut app, "/system Reply in haiku.");
    assert_eq!(app.session().system_prompt, "Reply in haiku.");

    process_input(&mut app, "/system");
    let shown = app
        .display_messages()
        .last()
        .map(|message| message.content.clone())
        .unwrap_or_default();
    assert!(shown.contains("Reply in haiku."));

    process_input(&mut app, "/system --clear");
    assert_eq!(app.session().system_prompt, "");
    assert_eq!(app.store.system_prompt().expect("read"), None);
}

#[test]
fn host_command_requests_model_refresh() {
    let mut app = create_test_app();
    assert_eq!(
        process_input(&mut app, "/host 10.0.0.5:11434"),
        CommandResult::RefreshModels
    );
    assert_eq!(app.host, "http://10.0.0.5:11434");
    assert_eq!(process_input(&mut app, "/models"), CommandResult::RefreshModels);
}

#[test]
fn dump_command_writes_file() {
    let mut app = create_test_app();
    let params = app.submit_prompt("q".to_string()).expect("params");
    app.handle_stream_message(final_token("a", json!([3])), params.stream_id);

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("out.txt");
    process_input(&mut app, &format!("/dump {}", path.display()));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "You: q\n\na\n\n");
}

#[test]
fn log_command_records_following_turns() {
    let mut app = create_test_app();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("chat.log");

    process_input(&mut app, &format!("/log {}", path.display()));
    let params = app.submit_prompt("q".to_string()).expect("params");
    app.handle_stream_message(final_token("a", json!([3])), params.stream_id);

    let contents = std::fs::read_to_string(&path).expect("read");
    assert!(contents.starts_with("## Logging started at"));
    assert!(contents.contains("You: q\n\na\n\n"));

    process_input(&mut app, "/log");
    assert!(!app.logging.is_active());
}

#[test]
fn matching_commands_filters_by_prefix() {
    let names: Vec<&str> = matching_commands("/mo")
        .into_iter()
        .map(|command| command.name)
        .collect();
    assert_eq!(names, vec!["model", "models"]);
}
