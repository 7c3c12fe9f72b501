use crate::core::app::{App, NamePromptKind, UiMode};
use crate::ui::layout::{centered_rect, ChatLayout};
use crate::ui::markdown::render_markdown;
use crate::ui::picker::PickerState;
use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Duration;

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.ui.theme.background_color)),
        area,
    );

    let layout = ChatLayout::compute(area, app.ui.input_line_count());

    f.render_widget(
        Paragraph::new(title_text(app)).style(app.ui.theme.title_style),
        layout.title,
    );

    app.update_scroll_position(layout.transcript.width, layout.transcript.height);
    let scroll_offset = app.ui.scroll_offset;
    let lines = app.display_lines(layout.transcript.width).to_vec();
    // Lines are prewrapped, so no ratatui wrapping here
    f.render_widget(
        Paragraph::new(lines).scroll((scroll_offset, 0)),
        layout.transcript,
    );

    render_input(f, app, layout);

    if let Some(status) = app.ui.status.as_deref() {
        f.render_widget(
            Paragraph::new(status.to_string()).style(app.ui.theme.app_info_style),
            layout.status,
        );
    }

    match &app.ui.mode {
        UiMode::Picker(picker) => render_picker(f, app, picker),
        UiMode::ErrorDialog { title, body } => render_error_dialog(f, app, title, body),
        UiMode::Typing | UiMode::NamePrompt(_) => {}
    }
}

fn title_text(app: &App) -> String {
    let model = if app.model().is_empty() {
        "no model"
    } else {
        app.model()
    };
    let mut title = format!(
        "llm-chat v{} - {} @ {} • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        model,
        app.host,
        app.logging.get_status_string()
    );
    if let Some(name) = &app.active_session_name {
        title.push_str(&format!(" • Chat: {name}"));
    }
    title
}

fn render_input(f: &mut Frame, app: &App, layout: ChatLayout) {
    let theme = &app.ui.theme;
    let title = match app.ui.mode {
        UiMode::NamePrompt(NamePromptKind::SaveSession) => {
            "Save chat as (Enter to save, Esc to cancel)".to_string()
        }
        _ if app.ui.is_streaming => format!(
            "{} Generating (Esc to stop)",
            pulse_symbol(app.ui.pulse_start.elapsed())
        ),
        _ => "Type your message (Alt+Enter for new line, /help for help, Ctrl+C to quit)"
            .to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(title, theme.input_title_style));
    let inner = block.inner(layout.input);
    f.render_widget(block, layout.input);
    f.render_widget(&app.ui.textarea, inner);
}

/// Streaming indicator cycling twice per second.
fn pulse_symbol(elapsed: Duration) -> &'static str {
    let phase = (elapsed.as_millis() as f32 / 1000.0 * 2.0) % 2.0;
    let intensity = if phase < 1.0 { phase } else { 2.0 - phase };
    if intensity < 0.33 {
        "○"
    } else if intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

fn render_picker(f: &mut Frame, app: &App, picker: &PickerState) {
    let theme = &app.ui.theme;
    let longest = picker
        .items
        .iter()
        .map(|item| item.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(picker.title.chars().count());
    let width = u16::try_from(longest + 6).unwrap_or(u16::MAX).max(30);
    let height = u16::try_from(picker.items.len() + 2).unwrap_or(u16::MAX);
    let area = centered_rect(width, height, f.area());

    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|item| ListItem::new(item.label.clone()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(picker.title.clone())
                .style(Style::default().bg(theme.background_color)),
        )
        .style(theme.assistant_text_style)
        .highlight_style(theme.selection_highlight_style)
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(picker.selected));

    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_error_dialog(f: &mut Frame, app: &App, title: &str, body: &str) {
    let theme = &app.ui.theme;
    let screen = f.area();
    let width = screen.width.saturating_sub(8).min(90);
    let area = centered_rect(width, screen.height.saturating_sub(4), screen);

    let mut lines = render_markdown(body, theme, theme.assistant_text_style);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter or Esc to continue",
        theme.app_info_style,
    )));

    let dialog = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.app_error_style)
                .title(Span::styled(title.to_string(), theme.app_error_style))
                .style(Style::default().bg(theme.background_color)),
        );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}
