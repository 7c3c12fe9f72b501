use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub app_info_style: Style,
    pub app_error_style: Style,

    // Chrome
    pub title_style: Style,
    pub streaming_indicator_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub selection_highlight_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,

    // Markdown
    pub md_code_style: Style,
    pub md_link_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            app_info_style: Style::default().fg(Color::DarkGray),
            app_error_style: Style::default().fg(Color::LightRed),

            title_style: Style::default().fg(Color::Gray),
            streaming_indicator_style: Style::default().fg(Color::White),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            selection_highlight_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),

            md_code_style: Style::default().fg(Color::Yellow),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    pub fn md_heading_style(&self, level: u8) -> Style {
        let base = self.assistant_text_style.add_modifier(Modifier::BOLD);
        match level {
            1 => base.add_modifier(Modifier::UNDERLINED),
            _ => base,
        }
    }

    pub fn md_blockquote_style(&self) -> Style {
        self.app_info_style.add_modifier(Modifier::ITALIC)
    }

    pub fn md_list_marker_style(&self) -> Style {
        self.user_prefix_style
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
