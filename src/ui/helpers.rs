use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::form::{Draft, Field};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

pub(crate) fn field_prefix(field: Field) -> String {
    format!("{}: ", field.label())
}

/// One line of the book form, highlighted when `field` has focus.
pub(crate) fn field_line(draft: &Draft, field: Field, focus: Field) -> Line<'static> {
    let value = draft.value(field);
    let is_active = field == focus;

    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(field_prefix(field)),
        Span::styled(display, style),
    ])
}

/// Shorten `text` to at most `width` characters, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut shortened: String = text.chars().take(width - 1).collect();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!("Dune", truncate("Dune", 4));
        assert_eq!("Grea…", truncate("Great Expectations", 5));
        assert_eq!("", truncate("Dune", 0));
    }

    #[test]
    fn empty_fields_show_a_placeholder() {
        let line = field_line(&Draft::default(), Field::Author, Field::Title);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!("Author: <required>", text);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(Rect::new(20, 15, 60, 20), popup);
    }
}
