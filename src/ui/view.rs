use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use super::helpers::{centered_rect, field_line, field_prefix, truncate};
use crate::catalog::CatalogState;
use crate::form::{Field, FormState};
use crate::models::Book;

/// Footer space reserved for instructions.
const FOOTER_HEIGHT: u16 = 2;
const BANNER_HEIGHT: u16 = 1;

/// Draw one frame from a catalog snapshot. `focus` is the form field taking input.
pub(crate) fn draw(frame: &mut Frame, state: &CatalogState, focus: Field) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BANNER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    draw_banner(frame, chunks[0], state);
    draw_book_grid(frame, chunks[1], state);
    draw_footer(frame, chunks[2], state);

    if let Some(book) = &state.pending_delete {
        draw_confirm_delete(frame, area, book);
    } else {
        match &state.form {
            FormState::Closed => {}
            FormState::Creating(_) => draw_book_form(frame, area, "Add Book", state, focus),
            FormState::Editing { id, .. } => {
                let title = format!("Edit Book #{id}");
                draw_book_form(frame, area, &title, state, focus)
            }
        }
    }
}

fn draw_banner(frame: &mut Frame, area: Rect, state: &CatalogState) {
    let line = if let Some(error) = &state.error {
        Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::White).bg(Color::Red),
        ))
    } else if state.busy {
        Line::from(Span::styled("Loading…", Style::default().fg(Color::Yellow)))
    } else {
        Line::from(Span::styled(
            format!("{} books", state.books.len()),
            Style::default().fg(Color::Gray),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn draw_book_grid(frame: &mut Frame, area: Rect, state: &CatalogState) {
    let block = Block::default().title("Books").borders(Borders::ALL);

    if state.books.is_empty() {
        let message = if state.busy {
            "Fetching books…"
        } else {
            "No books yet. Press [a] to add one."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let title_width = usize::from(area.width / 2).max(8);
    let rows = state.books.iter().map(|book| {
        Row::new(vec![
            Cell::from(book.id.to_string()),
            Cell::from(truncate(&book.title, title_width)),
            Cell::from(book.author.clone()),
            Cell::from(book.isbn.to_string()),
        ])
    });

    let header = Row::new(vec!["ID", "Title", "Author", "ISBN"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &CatalogState) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let keys: &[(&str, &str)] = if state.busy {
        &[("[q]", " Quit")]
    } else if state.pending_delete.is_some() {
        &[("[y]", " Delete   "), ("[n/Esc]", " Keep")]
    } else if state.form.is_open() {
        &[
            ("[Tab]", " Next field   "),
            ("[Enter]", " Save   "),
            ("[Esc]", " Cancel"),
        ]
    } else {
        &[
            ("[↑↓]", " Navigate   "),
            ("[a]", " Add   "),
            ("[e]", " Edit   "),
            ("[d]", " Delete   "),
            ("[r]", " Reload   "),
            ("[q]", " Quit"),
        ]
    };

    let spans: Vec<Span<'static>> = keys
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(key.to_string(), key_style),
                Span::raw(label.to_string()),
            ]
        })
        .collect();

    let block = Block::default().borders(Borders::TOP);
    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_book_form(frame: &mut Frame, area: Rect, title: &str, state: &CatalogState, focus: Field) {
    let Some(draft) = state.form.draft() else {
        return;
    };

    let popup_area = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut lines: Vec<Line<'static>> = Field::ALL
        .iter()
        .map(|field| field_line(draft, *field, focus))
        .collect();
    lines.push(Line::from(""));

    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if state.busy {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);

    let row = Field::ALL.iter().position(|f| *f == focus).unwrap_or(0) as u16;
    let column = (field_prefix(focus).chars().count() + draft.value(focus).chars().count()) as u16;
    frame.set_cursor_position((inner.x + column, inner.y + row));
}

fn draw_confirm_delete(frame: &mut Frame, area: Rect, book: &Book) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Confirm Delete")
        .borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let lines = vec![
        Line::from(format!("Delete \"{}\" by {}?", book.title, book.author)),
        Line::from(""),
        Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    use super::*;

    fn render(state: &CatalogState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| draw(frame, state, Field::Title))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn dune() -> Book {
        Book {
            id: 7,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            isbn: 9780441013593,
        }
    }

    #[test]
    fn grid_lists_every_book() {
        let state = CatalogState {
            books: vec![dune()],
            ..CatalogState::default()
        };

        let screen = render(&state);
        assert!(screen.contains("Dune"));
        assert!(screen.contains("Herbert"));
        assert!(screen.contains("9780441013593"));
        assert!(screen.contains("1 books"));
    }

    #[test]
    fn error_banner_is_shown() {
        let state = CatalogState {
            error: Some("Failed to load books.".to_string()),
            ..CatalogState::default()
        };

        let screen = render(&state);
        assert!(screen.contains("Failed to load books."));
        assert!(screen.contains("No books yet"));
    }

    #[test]
    fn edit_form_shows_the_draft() {
        let state = CatalogState {
            books: vec![dune()],
            form: FormState::editing(&dune()),
            ..CatalogState::default()
        };

        let screen = render(&state);
        assert!(screen.contains("Edit Book #7"));
        assert!(screen.contains("Author: Herbert"));
    }

    #[test]
    fn confirmation_takes_precedence_over_grid() {
        let state = CatalogState {
            books: vec![dune()],
            pending_delete: Some(dune()),
            ..CatalogState::default()
        };

        let screen = render(&state);
        assert!(screen.contains("Delete \"Dune\" by Herbert?"));
        assert!(screen.contains("[y]"));
    }
}
