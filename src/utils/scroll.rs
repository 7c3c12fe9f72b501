use crate::core::message::Message;
use crate::ui::markdown::render_message;
use crate::ui::theme::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Handles all scroll-related calculations and line building
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Pre-wrap the given lines to a specific width, preserving styles and wrapping at word
    /// boundaries (long words are broken at grapheme boundaries).
    /// Rendering the result without ratatui's own wrapping keeps line counts exact.
    pub fn prewrap_lines(lines: &[Line<'_>], terminal_width: u16) -> Vec<Line<'static>> {
        let width = terminal_width as usize;
        let mut out: Vec<Line<'static>> = Vec::with_capacity(lines.len());

        for line in lines {
            if width == 0 || line.spans.is_empty() {
                out.push(owned_line(line));
                continue;
            }
            LineWrapper::new(width).wrap(line, &mut out);
        }

        out
    }

    /// Render and wrap every message for display.
    pub fn build_display_lines<'m>(
        messages: impl IntoIterator<Item = &'m Message>,
        theme: &Theme,
        markdown_enabled: bool,
        terminal_width: u16,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in messages {
            let rendered = render_message(message, theme, markdown_enabled);
            lines.extend(Self::prewrap_lines(&rendered, terminal_width));
        }
        lines
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll_offset(total_lines: usize, available_height: u16) -> u16 {
        let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
        total.saturating_sub(available_height)
    }
}

fn owned_line(line: &Line<'_>) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|s| Span::styled(s.content.to_string(), s.style))
        .collect();
    Line::from(spans)
}

struct LineWrapper {
    width: usize,
    out_spans: Vec<Span<'static>>,
    line_width: usize,
    word: Vec<(String, Style)>,
    word_width: usize,
    emitted: usize,
}

impl LineWrapper {
    fn new(width: usize) -> Self {
        Self {
            width,
            out_spans: Vec::new(),
            line_width: 0,
            word: Vec::new(),
            word_width: 0,
            emitted: 0,
        }
    }

    fn wrap(mut self, line: &Line<'_>, out: &mut Vec<Line<'static>>) {
        for span in &line.spans {
            for grapheme in span.content.graphemes(true) {
                if grapheme == " " {
                    self.flush_word(out);
                    if self.line_width < self.width {
                        self.append(" ", span.style);
                        self.line_width += 1;
                    } else {
                        self.emit(out);
                    }
                } else {
                    match self.word.last_mut() {
                        Some((text, style)) if *style == span.style => text.push_str(grapheme),
                        _ => self.word.push((grapheme.to_string(), span.style)),
                    }
                    self.word_width += grapheme.width();
                }
            }
        }
        self.flush_word(out);
        if !self.out_spans.is_empty() || self.emitted == 0 {
            self.emit(out);
        }
    }

    fn append(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.out_spans.last_mut() {
            if last.style == style {
                let combined = format!("{}{}", last.content, text);
                *last = Span::styled(combined, style);
                return;
            }
        }
        self.out_spans.push(Span::styled(text.to_string(), style));
    }

    fn emit(&mut self, out: &mut Vec<Line<'static>>) {
        out.push(Line::from(std::mem::take(&mut self.out_spans)));
        self.line_width = 0;
        self.emitted += 1;
    }

    fn flush_word(&mut self, out: &mut Vec<Line<'static>>) {
        if self.word_width == 0 {
            self.word.clear();
            return;
        }
        if self.line_width > 0 && self.line_width + self.word_width > self.width {
            self.emit(out);
        }
        for (text, style) in std::mem::take(&mut self.word) {
            if self.line_width + text.width() <= self.width {
                self.line_width += text.width();
                self.append(&text, style);
                continue;
            }
            // Break an overlong word at grapheme boundaries.
            for grapheme in text.graphemes(true) {
                let grapheme_width = grapheme.width();
                if self.line_width > 0 && self.line_width + grapheme_width > self.width {
                    self.emit(out);
                }
                self.append(grapheme, style);
                self.line_width += grapheme_width;
            }
        }
        self.word_width = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = vec![Line::from("the quick brown fox")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 10);
        assert_eq!(texts(&wrapped), vec!["the quick ", "brown fox"]);
    }

    #[test]
    fn breaks_words_longer_than_width() {
        let lines = vec![Line::from("abcdefghij")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 4);
        assert_eq!(texts(&wrapped), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn counts_wide_characters_by_display_width() {
        let lines = vec![Line::from("日本語です")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 4);
        assert_eq!(texts(&wrapped), vec!["日本", "語で", "す"]);
    }

    #[test]
    fn preserves_styles_across_wraps() {
        let red = Style::default().fg(Color::Red);
        let lines = vec![Line::from(vec![
            Span::raw("plain "),
            Span::styled("styled words", red),
        ])];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 8);
        assert_eq!(texts(&wrapped), vec!["plain ", "styled ", "words"]);
        assert_eq!(wrapped[2].spans[0].style, red);
    }

    #[test]
    fn keeps_empty_lines() {
        let lines = vec![Line::from("a"), Line::from(""), Line::from("b")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 20);
        assert_eq!(texts(&wrapped), vec!["a", "", "b"]);
    }

    #[test]
    fn display_lines_cover_every_message() {
        let messages = vec![Message::user("hi"), Message::assistant("hello there")];
        let lines =
            ScrollCalculator::build_display_lines(&messages, &Theme::dark_default(), true, 80);
        assert_eq!(texts(&lines), vec!["You: hi", "", "hello there", ""]);
    }

    #[test]
    fn max_scroll_offset_saturates() {
        assert_eq!(ScrollCalculator::max_scroll_offset(5, 10), 0);
        assert_eq!(ScrollCalculator::max_scroll_offset(25, 10), 15);
    }
}
