//! Markdown and plain-text rendering of transcript messages into styled lines.
//!
//! Rendering is a pure function of the message text: raw HTML is shown as
//! literal text and nothing in the markup is executed or fetched.

use crate::core::message::{Message, TranscriptRole};
use crate::ui::theme::Theme;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const USER_PREFIX: &str = "You: ";
const INFO_PREFIX: &str = "· ";
const ERROR_PREFIX: &str = "! ";
const CODE_INDENT: &str = "  ";
const QUOTE_BAR: &str = "│ ";

/// Render one message into unwrapped lines, followed by a blank separator.
pub fn render_message(message: &Message, theme: &Theme, markdown_enabled: bool) -> Vec<Line<'static>> {
    let mut lines = match message.role {
        TranscriptRole::Assistant if markdown_enabled => {
            MarkdownRenderer::new(theme, theme.assistant_text_style).render(&message.content)
        }
        TranscriptRole::Assistant => render_plain(&message.content, theme.assistant_text_style),
        TranscriptRole::User => prefix_lines(
            render_plain(&message.content, theme.user_text_style),
            Span::styled(USER_PREFIX, theme.user_prefix_style),
        ),
        TranscriptRole::AppInfo => prefix_lines(
            render_plain(&message.content, theme.app_info_style),
            Span::styled(INFO_PREFIX, theme.app_info_style),
        ),
        TranscriptRole::AppError => prefix_lines(
            render_plain(&message.content, theme.app_error_style),
            Span::styled(ERROR_PREFIX, theme.app_error_style.add_modifier(Modifier::BOLD)),
        ),
    };

    while lines.last().is_some_and(line_is_blank) {
        lines.pop();
    }
    if !message.content.is_empty() {
        lines.push(Line::from(""));
    }
    lines
}

/// Render standalone markdown (dialogs, help text).
pub fn render_markdown(content: &str, theme: &Theme, base_style: Style) -> Vec<Line<'static>> {
    MarkdownRenderer::new(theme, base_style).render(content)
}

fn render_plain(content: &str, style: Style) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|line| Line::from(Span::styled(detab(line), style)))
        .collect()
}

fn prefix_lines(lines: Vec<Line<'static>>, prefix: Span<'static>) -> Vec<Line<'static>> {
    let indent = " ".repeat(prefix.content.width());
    let mut prefix = Some(prefix);
    lines
        .into_iter()
        .map(|line| {
            let lead = prefix.take().unwrap_or_else(|| Span::raw(indent.clone()));
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(lead);
            spans.extend(line.spans);
            Line::from(spans)
        })
        .collect()
}

fn line_is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|span| span.content.trim().is_empty())
}

fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

enum ListKind {
    Ordered(u64),
    Unordered,
}

struct MarkdownRenderer<'a> {
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    link_targets: Vec<String>,
    quote_depth: usize,
    in_code_block: bool,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(theme: &'a Theme, base_style: Style) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![base_style],
            list_stack: Vec::new(),
            link_targets: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current.is_empty() && self.quote_depth > 0 {
            let bars = QUOTE_BAR.repeat(self.quote_depth);
            self.current
                .push(Span::styled(bars, self.theme.md_blockquote_style()));
        }
        self.current.push(span);
    }

    fn push_text(&mut self, text: &str) {
        let style = self.style();
        self.push_span(Span::styled(text.to_string(), style));
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank_line(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|line| !line_is_blank(line)) {
            self.lines.push(Line::from(""));
        }
    }

    fn render(mut self, content: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => {
                    if self.in_code_block {
                        self.code_text(&text);
                    } else {
                        self.push_text(&text);
                    }
                }
                Event::Code(code) => {
                    let style = self.theme.md_code_style;
                    self.push_span(Span::styled(code.to_string(), style));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    for (idx, part) in html.split('\n').enumerate() {
                        if idx > 0 {
                            self.flush_line();
                        }
                        if !part.is_empty() {
                            self.push_text(part);
                        }
                    }
                }
                Event::SoftBreak => self.push_text(" "),
                Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    let style = self.theme.app_info_style;
                    self.lines.push(Line::from(Span::styled("─".repeat(24), style)));
                    self.blank_line();
                }
                Event::TaskListMarker(checked) => {
                    self.push_text(if checked { "[x] " } else { "[ ] " });
                }
                Event::FootnoteReference(name) => self.push_text(&format!("[^{name}]")),
                Event::InlineMath(math) | Event::DisplayMath(math) => self.push_text(&math),
            }
        }

        self.flush_line();
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush_line();
                let level = heading_level(level);
                self.style_stack.push(self.theme.md_heading_style(level));
                self.push_text(&format!("{} ", "#".repeat(level as usize)));
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    let lang = lang.trim();
                    if !lang.is_empty() {
                        let style = self.theme.app_info_style;
                        self.push_span(Span::styled(format!("{CODE_INDENT}{lang}"), style));
                        self.flush_line();
                    }
                }
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let current = *n;
                        *n += 1;
                        format!("{current}. ")
                    }
                    _ => "- ".to_string(),
                };
                let indent = "  ".repeat(depth);
                let style = self.theme.md_list_marker_style();
                self.push_span(Span::styled(format!("{indent}{marker}"), style));
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.link_targets.push(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.push_text("[image: ");
                self.link_targets.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.list_stack.is_empty() {
                    self.blank_line();
                } else {
                    self.flush_line();
                }
            }
            TagEnd::Heading(_) => {
                self.pop_style();
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.blank_line();
                }
            }
            TagEnd::CodeBlock => {
                self.flush_line();
                self.in_code_block = false;
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(target) = self.link_targets.pop() {
                    let shown = self
                        .current
                        .last()
                        .is_some_and(|span| span.content.as_ref() == target);
                    if !shown && !target.is_empty() {
                        let style = self.theme.app_info_style;
                        self.push_span(Span::styled(format!(" ({target})"), style));
                    }
                }
            }
            TagEnd::Image => {
                if let Some(target) = self.link_targets.pop() {
                    self.push_text(&format!("] ({target})"));
                }
                self.pop_style();
            }
            _ => {}
        }
    }

    fn code_text(&mut self, text: &str) {
        let style = self.theme.md_code_style;
        for line in text.lines() {
            self.push_span(Span::styled(format!("{CODE_INDENT}{}", detab(line)), style));
            self.flush_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render_assistant(content: &str) -> Vec<String> {
        let theme = Theme::dark_default();
        text_of(&render_message(&Message::assistant(content), &theme, true))
    }

    #[test]
    fn bold_text_is_styled_without_markers() {
        let theme = Theme::dark_default();
        let lines = render_message(&Message::assistant("say **hi**"), &theme, true);
        assert_eq!(text_of(&lines), vec!["say hi", ""]);
        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "hi")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn partial_markup_renders_without_panicking() {
        assert_eq!(render_assistant("**unfinished"), vec!["**unfinished", ""]);
        assert_eq!(render_assistant("```rust\nfn main("), vec!["  rust", "  fn main(", ""]);
    }

    #[test]
    fn lists_and_headings_get_markers() {
        let lines = render_assistant("# Title\n\n- one\n- two\n\n3. three\n");
        assert_eq!(
            lines,
            vec!["# Title", "", "- one", "- two", "", "3. three", ""]
        );
    }

    #[test]
    fn raw_html_is_shown_literally() {
        let lines = render_assistant("<script>alert(1)</script>");
        assert_eq!(lines[0], "<script>alert(1)</script>");
    }

    #[test]
    fn links_show_their_target() {
        let lines = render_assistant("see [docs](https://example.com)");
        assert_eq!(lines[0], "see docs (https://example.com)");
    }

    #[test]
    fn plain_mode_keeps_markup_verbatim() {
        let theme = Theme::dark_default();
        let lines = render_message(&Message::assistant("**raw**"), &theme, false);
        assert_eq!(text_of(&lines), vec!["**raw**", ""]);
    }

    #[test]
    fn user_lines_are_prefixed_then_indented() {
        let theme = Theme::dark_default();
        let lines = render_message(&Message::user("first\nsecond"), &theme, true);
        assert_eq!(text_of(&lines), vec!["You: first", "     second", ""]);
    }

    #[test]
    fn empty_assistant_message_renders_nothing() {
        assert!(render_assistant("").is_empty());
    }
}
