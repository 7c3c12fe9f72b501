use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Input rows shown before the input area starts scrolling.
pub const MAX_INPUT_ROWS: u16 = 6;

/// Screen regions of the chat view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub title: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

impl ChatLayout {
    pub fn compute(area: Rect, input_lines: usize) -> Self {
        let input_rows = u16::try_from(input_lines)
            .unwrap_or(MAX_INPUT_ROWS)
            .clamp(1, MAX_INPUT_ROWS);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(input_rows + 2), // +2 for borders
                Constraint::Length(1),
            ])
            .split(area);
        Self {
            title: chunks[0],
            transcript: chunks[1],
            input: chunks[2],
            status: chunks[3],
        }
    }

    /// Transcript viewport for a terminal of the given size.
    pub fn transcript_size(width: u16, height: u16, input_lines: usize) -> (u16, u16) {
        let layout = Self::compute(Rect::new(0, 0, width, height), input_lines);
        (layout.transcript.width, layout.transcript.height)
    }
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_area_grows_up_to_limit() {
        let area = Rect::new(0, 0, 80, 24);
        let one = ChatLayout::compute(area, 1);
        assert_eq!(one.input.height, 3);
        assert_eq!(one.transcript.height, 24 - 1 - 3 - 1);

        let many = ChatLayout::compute(area, 50);
        assert_eq!(many.input.height, MAX_INPUT_ROWS + 2);
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(10, 3, 20, 4));
        assert_eq!(centered_rect(100, 100, area), area);
    }
}
