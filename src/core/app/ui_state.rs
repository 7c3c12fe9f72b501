use crate::core::message::Message;
use crate::ui::picker::PickerState;
use crate::ui::theme::Theme;
use ratatui::text::Line;
use std::time::{Duration, Instant};
use tui_textarea::TextArea;

/// Scrolling back down to within this many rows of the bottom re-enables
/// auto-scroll.
pub const AUTO_SCROLL_SNAP_ROWS: u16 = 2;

/// How long a status message stays visible.
pub const STATUS_TTL: Duration = Duration::from_secs(6);

/// What the single-line name prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePromptKind {
    SaveSession,
}

/// Current UI interaction mode.
#[derive(Debug, Clone)]
pub enum UiMode {
    /// Default typing mode for composing new prompts.
    Typing,

    /// Choosing a model or a saved session from a list.
    Picker(PickerState),

    /// Collecting a name in the input area.
    NamePrompt(NamePromptKind),

    /// Blocking dialog with a markdown body; dismissed with Esc or Enter.
    ErrorDialog { title: String, body: String },
}

/// App-authored line shown in the transcript but never saved.
///
/// `anchor` is the transcript length when the notice was raised, so it stays
/// after the turn it refers to.
#[derive(Debug, Clone)]
pub struct Notice {
    pub anchor: usize,
    pub message: Message,
}

#[derive(Debug, Clone, Default)]
struct DisplayLinesCache {
    valid: bool,
    width: u16,
    markdown_enabled: bool,
    revision: u64,
    lines: Vec<Line<'static>>,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: UiMode,
    pub textarea: TextArea<'static>,
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub is_streaming: bool,
    pub pulse_start: Instant,
    pub exit_requested: bool,
    /// Unsent message set aside while the input is borrowed by a name prompt.
    stashed_input: Option<String>,
    revision: u64,
    lines_cache: DisplayLinesCache,
}

impl UiState {
    pub fn new(theme: Theme, markdown_enabled: bool) -> Self {
        let mut ui = Self {
            mode: UiMode::Typing,
            textarea: TextArea::default(),
            theme,
            markdown_enabled,
            status: None,
            status_set_at: None,
            scroll_offset: 0,
            auto_scroll: true,
            is_streaming: false,
            pulse_start: Instant::now(),
            exit_requested: false,
            stashed_input: None,
            revision: 0,
            lines_cache: DisplayLinesCache::default(),
        };
        ui.configure_textarea();
        ui
    }

    pub(crate) fn configure_textarea(&mut self) {
        let textarea_style = self
            .theme
            .input_text_style
            .patch(ratatui::style::Style::default().bg(self.theme.background_color));
        self.textarea.set_style(textarea_style);
        self.textarea.set_cursor_style(self.theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(ratatui::style::Style::default());
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_input_text(&mut self, text: &str) {
        let lines: Vec<String> = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(tui_textarea::CursorMove::Bottom);
        self.textarea.move_cursor(tui_textarea::CursorMove::End);
        self.configure_textarea();
    }

    pub fn clear_input(&mut self) {
        self.set_input_text("");
    }

    /// Take the composed text and leave the input empty.
    pub fn take_input(&mut self) -> String {
        let text = self.input_text();
        self.clear_input();
        text
    }

    /// Set the current draft aside and fill the input with `replacement`.
    pub fn stash_input(&mut self, replacement: &str) {
        self.stashed_input = Some(self.input_text());
        self.set_input_text(replacement);
    }

    /// Put back a draft set aside by [`UiState::stash_input`].
    pub fn restore_input(&mut self) {
        match self.stashed_input.take() {
            Some(draft) => self.set_input_text(&draft),
            None => self.clear_input(),
        }
    }

    pub fn input_line_count(&self) -> usize {
        self.textarea.lines().len().max(1)
    }

    pub fn set_status<S: Into<String>>(&mut self, s: S) {
        self.status = Some(s.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn status_expired(&self) -> bool {
        self.status_set_at
            .is_some_and(|set_at| set_at.elapsed() >= STATUS_TTL)
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_set_at = None;
    }

    pub fn begin_streaming(&mut self) {
        self.is_streaming = true;
        self.pulse_start = Instant::now();
    }

    pub fn end_streaming(&mut self) {
        self.is_streaming = false;
    }

    pub fn in_typing_mode(&self) -> bool {
        matches!(self.mode, UiMode::Typing)
    }

    pub fn picker(&self) -> Option<&PickerState> {
        match &self.mode {
            UiMode::Picker(state) => Some(state),
            _ => None,
        }
    }

    pub fn picker_mut(&mut self) -> Option<&mut PickerState> {
        match &mut self.mode {
            UiMode::Picker(state) => Some(state),
            _ => None,
        }
    }

    pub fn show_error_dialog(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.mode = UiMode::ErrorDialog {
            title: title.into(),
            body: body.into(),
        };
    }

    pub fn return_to_typing(&mut self) {
        self.mode = UiMode::Typing;
    }

    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self, max_scroll: u16) {
        self.scroll_offset = max_scroll;
        self.auto_scroll = true;
    }

    /// Moving up always stops following new output.
    pub fn scroll_up(&mut self, rows: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    /// Moving down re-enables following once the view is close to the bottom.
    pub fn scroll_down(&mut self, rows: u16, max_scroll: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows).min(max_scroll);
        if max_scroll.saturating_sub(self.scroll_offset) <= AUTO_SCROLL_SNAP_ROWS {
            self.scroll_to_bottom(max_scroll);
        }
    }

    /// Pin the view to the bottom while following, otherwise keep it in range.
    pub fn update_scroll_position(&mut self, max_scroll: u16) {
        if self.auto_scroll {
            self.scroll_offset = max_scroll;
        } else {
            self.scroll_offset = self.scroll_offset.min(max_scroll);
        }
    }

    /// Mark the transcript as changed so display lines are rebuilt.
    pub fn invalidate_lines(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Wrapped transcript lines, rebuilt only when the transcript, width or
    /// markdown flag changed since the last call.
    pub fn display_lines_with<F>(&mut self, width: u16, build: F) -> &[Line<'static>]
    where
        F: FnOnce(&Theme, bool) -> Vec<Line<'static>>,
    {
        let cache = &self.lines_cache;
        let fresh = cache.valid
            && cache.width == width
            && cache.markdown_enabled == self.markdown_enabled
            && cache.revision == self.revision;
        if !fresh {
            self.lines_cache = DisplayLinesCache {
                valid: true,
                width,
                markdown_enabled: self.markdown_enabled,
                revision: self.revision,
                lines: build(&self.theme, self.markdown_enabled),
            };
        }
        &self.lines_cache.lines
    }
}
