//! Key and mouse handling for each UI mode.
//!
//! Handlers mutate the [`App`] directly and report follow-up work that needs
//! the event loop (spawning a stream, fetching models, exiting).

use crate::commands::{process_input, CommandResult};
use crate::core::app::{App, NamePromptKind, UiMode};
use crate::core::chat_stream::StreamParams;
use crate::ui::layout::ChatLayout;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tui_textarea::Input as TAInput;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: u16 = 3;

/// Work the event loop has to do after a key was handled.
pub enum LoopAction {
    None,
    Spawn(StreamParams),
    RefreshModels,
    Exit,
}

/// Terminal size at the time of the event.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    pub term_width: u16,
    pub term_height: u16,
}

impl KeyContext {
    fn transcript_viewport(&self, app: &App) -> (u16, u16) {
        ChatLayout::transcript_size(
            self.term_width,
            self.term_height,
            app.ui.input_line_count(),
        )
    }

    fn max_scroll(&self, app: &mut App) -> u16 {
        let (width, height) = self.transcript_viewport(app);
        app.max_scroll(width, height)
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent, ctx: KeyContext) -> LoopAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c')) {
        app.cancel_current_stream();
        app.request_exit();
        return LoopAction::Exit;
    }

    match &app.ui.mode {
        UiMode::ErrorDialog { .. } => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                app.ui.return_to_typing();
            }
            LoopAction::None
        }
        UiMode::Picker(_) => {
            handle_picker_key(app, key);
            LoopAction::None
        }
        UiMode::NamePrompt(kind) => {
            let kind = *kind;
            handle_name_prompt_key(app, key, kind);
            LoopAction::None
        }
        UiMode::Typing => handle_typing_key(app, key, ctx),
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Enter => app.apply_picker_selection(),
        KeyCode::Delete => app.delete_picker_selection(),
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(picker) = app.ui.picker_mut() {
                picker.move_up();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(picker) = app.ui.picker_mut() {
                picker.move_down();
            }
        }
        _ => {}
    }
}

fn handle_name_prompt_key(app: &mut App, key: KeyEvent, kind: NamePromptKind) {
    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Enter => {
            let name = app.ui.input_text();
            app.ui.restore_input();
            app.ui.return_to_typing();
            match kind {
                NamePromptKind::SaveSession => {
                    if let Err(err) = app.save_session(&name) {
                        app.set_status(err.to_string());
                    }
                }
            }
        }
        _ => {
            app.ui.textarea.input(TAInput::from(key));
        }
    }
}

fn handle_typing_key(app: &mut App, key: KeyEvent, ctx: KeyContext) -> LoopAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Esc => {
            if !app.cancel_current_stream() {
                app.ui.clear_status();
            }
        }
        KeyCode::Char('n') if ctrl => app.new_chat(),
        KeyCode::Char('s') if ctrl => app.open_save_prompt(),
        KeyCode::Char('o') if ctrl => app.open_session_picker(),
        KeyCode::Char('p') if ctrl => app.open_model_picker(),
        KeyCode::Char('y') if ctrl => app.copy_last_response(),
        KeyCode::Enter if alt || shift => app.ui.textarea.insert_newline(),
        KeyCode::Enter => return submit_input(app),
        KeyCode::PageUp => {
            let (_, height) = ctx.transcript_viewport(app);
            app.ui.scroll_up(height.max(1));
        }
        KeyCode::PageDown => {
            let (_, height) = ctx.transcript_viewport(app);
            let max_scroll = ctx.max_scroll(app);
            app.ui.scroll_down(height.max(1), max_scroll);
        }
        KeyCode::Home if ctrl => app.ui.scroll_to_top(),
        KeyCode::End if ctrl => {
            let max_scroll = ctx.max_scroll(app);
            app.ui.scroll_to_bottom(max_scroll);
        }
        KeyCode::Up if ctrl || app.ui.input_text().is_empty() => app.ui.scroll_up(1),
        KeyCode::Down if ctrl || app.ui.input_text().is_empty() => {
            let max_scroll = ctx.max_scroll(app);
            app.ui.scroll_down(1, max_scroll);
        }
        _ => {
            app.ui.textarea.input(TAInput::from(key));
        }
    }
    LoopAction::None
}

fn submit_input(app: &mut App) -> LoopAction {
    let text = app.ui.input_text();
    if text.trim().is_empty() {
        return LoopAction::None;
    }

    match process_input(app, &text) {
        CommandResult::ProcessAsMessage(message) => {
            // Keep the draft when the prompt cannot be sent yet
            match app.submit_prompt(message) {
                Some(params) => {
                    app.ui.clear_input();
                    LoopAction::Spawn(params)
                }
                None => LoopAction::None,
            }
        }
        result => {
            if !matches!(app.ui.mode, UiMode::NamePrompt(_)) {
                app.ui.clear_input();
            }
            match result {
                CommandResult::OpenModelPicker => app.open_model_picker(),
                CommandResult::OpenSessionPicker => app.open_session_picker(),
                CommandResult::RefreshModels => return LoopAction::RefreshModels,
                CommandResult::Continue | CommandResult::ProcessAsMessage(_) => {}
            }
            LoopAction::None
        }
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent, ctx: KeyContext) -> bool {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.ui.scroll_up(WHEEL_ROWS);
            true
        }
        MouseEventKind::ScrollDown => {
            let max_scroll = ctx.max_scroll(app);
            app.ui.scroll_down(WHEEL_ROWS, max_scroll);
            true
        }
        _ => false,
    }
}

/// Insert pasted text at the cursor, normalizing line endings.
pub fn handle_paste(app: &mut App, text: &str) {
    let normalized = sanitize_paste(text);
    match app.ui.mode {
        UiMode::Typing => {
            app.ui.textarea.insert_str(normalized);
        }
        UiMode::NamePrompt(_) => {
            let first_line = normalized.lines().next().unwrap_or_default();
            app.ui.textarea.insert_str(first_line);
        }
        UiMode::Picker(_) | UiMode::ErrorDialog { .. } => {}
    }
}

/// Tabs become spaces and control characters other than newlines are dropped.
fn sanitize_paste(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\t', "    ")
        .replace('\r', "\n")
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TransportError;
    use crate::utils::test_utils::{create_test_app, token};

    const CTX: KeyContext = KeyContext {
        term_width: 60,
        term_height: 12,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c)), CTX);
        }
    }

    #[test]
    fn enter_submits_typed_prompt() {
        let mut app = create_test_app();
        type_text(&mut app, "hi");
        match handle_key(&mut app, key(KeyCode::Enter), CTX) {
            LoopAction::Spawn(params) => assert_eq!(params.request.prompt, "hi"),
            _ => panic!("expected a stream to start"),
        }
        assert_eq!(app.ui.input_text(), "");
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut app = create_test_app();
        type_text(&mut app, "  ");
        assert!(matches!(
            handle_key(&mut app, key(KeyCode::Enter), CTX),
            LoopAction::None
        ));
        assert!(app.session().transcript.is_empty());
    }

    #[test]
    fn draft_is_kept_when_submitting_while_streaming() {
        let mut app = create_test_app();
        app.submit_prompt("first".to_string()).expect("params");
        type_text(&mut app, "second");
        assert!(matches!(
            handle_key(&mut app, key(KeyCode::Enter), CTX),
            LoopAction::None
        ));
        assert_eq!(app.ui.input_text(), "second");
    }

    #[test]
    fn alt_enter_inserts_newline() {
        let mut app = create_test_app();
        type_text(&mut app, "a");
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT), CTX);
        type_text(&mut app, "b");
        assert_eq!(app.ui.input_text(), "a\nb");
    }

    #[test]
    fn escape_cancels_stream() {
        let mut app = create_test_app();
        let params = app.submit_prompt("q".to_string()).expect("params");
        app.handle_stream_message(token("x"), params.stream_id);

        handle_key(&mut app, key(KeyCode::Esc), CTX);
        assert!(!app.is_streaming());
        assert!(params.cancel_token.is_cancelled());
    }

    #[test]
    fn ctrl_c_exits() {
        let mut app = create_test_app();
        assert!(matches!(handle_key(&mut app, ctrl('c'), CTX), LoopAction::Exit));
        assert!(app.ui.exit_requested);
    }

    #[test]
    fn ctrl_s_then_enter_saves_named_chat() {
        let mut app = create_test_app();
        handle_key(&mut app, ctrl('s'), CTX);
        type_text(&mut app, "notes");
        handle_key(&mut app, key(KeyCode::Enter), CTX);

        assert!(app.ui.in_typing_mode());
        assert_eq!(app.store.list().expect("list"), vec!["notes".to_string()]);
        assert_eq!(app.ui.input_text(), "");
    }

    #[test]
    fn ctrl_s_keeps_unsent_draft() {
        let mut app = create_test_app();
        type_text(&mut app, "my long unsent draft");
        handle_key(&mut app, ctrl('s'), CTX);
        assert_eq!(app.ui.input_text(), "");

        handle_key(&mut app, key(KeyCode::Esc), CTX);
        assert!(app.ui.in_typing_mode());
        assert_eq!(app.ui.input_text(), "my long unsent draft");

        handle_key(&mut app, ctrl('s'), CTX);
        type_text(&mut app, "kept");
        handle_key(&mut app, key(KeyCode::Enter), CTX);
        assert_eq!(app.store.list().expect("list"), vec!["kept".to_string()]);
        assert_eq!(app.ui.input_text(), "my long unsent draft");
    }

    #[test]
    fn ctrl_o_picker_deletes_with_delete_key() {
        let mut app = create_test_app();
        app.save_session("a").expect("save");
        app.save_session("b").expect("save");

        // The picker opens on the chat saved last
        handle_key(&mut app, ctrl('o'), CTX);
        assert_eq!(app.ui.picker().and_then(|p| p.selected_id()), Some("b"));
        handle_key(&mut app, key(KeyCode::Delete), CTX);
        assert_eq!(app.store.list().expect("list"), vec!["a".to_string()]);

        handle_key(&mut app, key(KeyCode::Esc), CTX);
        assert!(app.ui.in_typing_mode());
    }

    #[test]
    fn error_dialog_is_dismissed_with_enter() {
        let mut app = create_test_app();
        app.apply_model_listing(Err(TransportError::Disconnected), None);
        type_text(&mut app, "ignored");
        assert_eq!(app.ui.input_text(), "");

        handle_key(&mut app, key(KeyCode::Enter), CTX);
        assert!(app.ui.in_typing_mode());
    }

    #[test]
    fn slash_model_opens_picker_and_clears_input() {
        let mut app = create_test_app();
        type_text(&mut app, "/model");
        handle_key(&mut app, key(KeyCode::Enter), CTX);
        assert!(app.ui.picker().is_some());
        assert_eq!(app.ui.input_text(), "");
    }

    #[test]
    fn scrolling_up_and_back_down_restores_follow() {
        let mut app = create_test_app();
        let params = app.submit_prompt("q".to_string()).expect("params");
        for _ in 0..40 {
            app.handle_stream_message(token("row\n\n"), params.stream_id);
        }
        let (width, height) = CTX.transcript_viewport(&app);
        app.update_scroll_position(width, height);

        handle_key(&mut app, key(KeyCode::PageUp), CTX);
        assert!(!app.ui.auto_scroll);

        handle_key(&mut app, key(KeyCode::PageDown), CTX);
        assert!(app.ui.auto_scroll);
    }

    #[test]
    fn paste_keeps_multiline_text() {
        let mut app = create_test_app();
        handle_paste(&mut app, "one\r\ntwo");
        assert_eq!(app.ui.input_text(), "one\ntwo");
    }

    #[test]
    fn paste_drops_control_characters() {
        let mut app = create_test_app();
        handle_paste(&mut app, "a\tb\u{1b}[31mred\u{7}\rnext");
        assert_eq!(app.ui.input_text(), "a    b[31mred\nnext");
    }
}
