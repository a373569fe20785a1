//! Stateless UI rendering for the chess board.

use chess_client::{BOARD_SIZE, Legality, Notification, Shade, Side, Tile, TurnPollingLoop};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;
use crate::input::ScreenSquare;

const SQUARES: u16 = BOARD_SIZE as u16;

/// Screen geometry of the drawn board, used to map the mouse back to squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardLayout {
    x: u16,
    y: u16,
    square_width: u16,
    square_height: u16,
}

impl BoardLayout {
    /// Board with its top-left corner at (`x`, `y`).
    pub fn new(x: u16, y: u16, square_width: u16, square_height: u16) -> Self {
        Self {
            x,
            y,
            square_width,
            square_height,
        }
    }

    /// Largest board that fits in `area`, centered. Squares are kept roughly
    /// twice as wide as they are tall.
    pub fn fit(area: Rect) -> Self {
        let square_height = (area.height / SQUARES).clamp(1, 3);
        let square_width = (area.width / SQUARES).min(2 * square_height + 1).max(1);
        let x = area.x + area.width.saturating_sub(square_width * SQUARES) / 2;
        let y = area.y + area.height.saturating_sub(square_height * SQUARES) / 2;
        Self::new(x, y, square_width, square_height)
    }

    /// Screen square under terminal cell (`column`, `row`).
    pub fn square_at(&self, column: u16, row: u16) -> Option<ScreenSquare> {
        if self.square_width == 0 || self.square_height == 0 {
            return None;
        }
        if column < self.x || row < self.y {
            return None;
        }
        let col = (column - self.x) / self.square_width;
        let row = (row - self.y) / self.square_height;
        if col >= SQUARES || row >= SQUARES {
            return None;
        }
        Some((row as u8, col as u8))
    }

    /// Terminal cells covered by a screen square.
    pub fn square_rect(&self, row: u8, col: u8) -> Rect {
        Rect::new(
            self.x + u16::from(col) * self.square_width,
            self.y + u16::from(row) * self.square_height,
            self.square_width,
            self.square_height,
        )
    }
}

/// Renders the board screen and returns where the board was drawn.
pub fn draw(frame: &mut Frame, app: &App) -> BoardLayout {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(10),   // Board and side panel
            Constraint::Length(1), // Help
        ])
        .split(area);

    let title = Paragraph::new("Chess")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(26), Constraint::Length(32)])
        .split(chunks[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(main[1]);

    let layout = draw_board(frame, main[0], app);
    draw_status(frame, side[0], app);
    draw_history(frame, side[1], app);

    let help = Paragraph::new(
        "drag/Enter move  Esc cancel  [ ] history  a auto-reply  r refresh  q quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);

    if let Some(notification) = app.controller().notification() {
        draw_notification(frame, area, notification);
    }

    layout
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) -> BoardLayout {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.controller().view_model().game()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = BoardLayout::fit(inner);
    for tile in app.controller().tiles() {
        let rect = layout
            .square_rect(tile.display_row, tile.display_col)
            .intersection(inner);
        if rect.is_empty() {
            continue;
        }
        let is_cursor = (tile.display_row, tile.display_col) == app.cursor();
        draw_square(frame, rect, &tile, is_cursor);
    }
    layout
}

fn square_style(tile: &Tile, is_cursor: bool) -> Style {
    let background = match (tile.highlight, tile.drag_source, tile.last_move, tile.shade) {
        (Some(Legality::Legal), _, _, _) => Color::Rgb(106, 190, 48),
        (Some(Legality::Illegal), _, _, _) => Color::Rgb(214, 69, 65),
        (None, true, _, _) => Color::Rgb(246, 246, 105),
        (None, false, true, Shade::Light) => Color::Rgb(205, 210, 106),
        (None, false, true, Shade::Dark) => Color::Rgb(170, 162, 58),
        (None, false, false, Shade::Light) => Color::Rgb(240, 217, 181),
        (None, false, false, Shade::Dark) => Color::Rgb(181, 136, 99),
    };
    let style = Style::default().bg(background).fg(Color::Black);
    if is_cursor {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn draw_square(frame: &mut Frame, area: Rect, tile: &Tile, is_cursor: bool) {
    let glyph = tile.piece.map(|p| p.glyph()).unwrap_or(' ');
    let mut lines = vec![Line::from(""); usize::from(area.height.saturating_sub(1) / 2)];
    lines.push(Line::from(glyph.to_string()));

    let square = Paragraph::new(lines)
        .style(square_style(tile, is_cursor).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(square, area);
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let controller = app.controller();
    let view = controller.view_model();
    let submission = controller.submission();

    let waiting = TurnPollingLoop::is_active(view.turn(), view.assignment());
    let turn = match view.turn().side() {
        Some(Side::White) => "white",
        Some(Side::Black) => "black",
        None => "-",
    };

    let mut lines = vec![
        Line::from(format!("You: {}", view.assignment())),
        Line::from(format!(
            "Turn: {}{}",
            turn,
            if waiting { " (waiting for opponent)" } else { "" }
        )),
        Line::from(format!("Auto-reply: {}", on_off(submission.auto_respond()))),
        Line::from(format!(
            "Ply: {}/{}{}",
            view.cursor(),
            view.history().len(),
            if view.is_viewing_history() { " (history)" } else { "" }
        )),
    ];
    if let Some(square) = app.cursor_coordinate() {
        lines.push(Line::from(format!("Cursor: {}", square)));
    }
    if let Some(session) = controller.drag().session() {
        let piece = view
            .board()
            .occupant(session.source())
            .map(|p| p.glyph())
            .unwrap_or('?');
        lines.push(Line::from(format!("Dragging {} from {}", piece, session.source())));
    }
    if submission.is_busy() {
        lines.push(Line::from(Span::styled(
            "Opponent is thinking...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }

    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, area);
}

fn draw_history(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.controller().view_model();

    let mut items = vec![ListItem::new("   start")];
    items.extend(
        view.history()
            .iter()
            .enumerate()
            .map(|(i, record)| ListItem::new(format!("{:>3}. {}", i + 1, record))),
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" History "))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(view.cursor()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let popup = center_rect(area, 50, 7);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(notification.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" {} ", notification.title)),
        );
    frame.render_widget(paragraph, popup);
}

/// Centers a `width` x `height` rectangle in `area`, shrinking it to fit.
pub fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_squares_wider_than_tall() {
        let layout = BoardLayout::fit(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.square_height, 3);
        assert_eq!(layout.square_width, 7);
        assert_eq!(layout.x, (80 - 56) / 2);
        assert_eq!(layout.y, 0);
    }

    #[test]
    fn test_fit_small_terminal() {
        let layout = BoardLayout::fit(Rect::new(2, 1, 30, 10));
        assert_eq!(layout.square_height, 1);
        assert_eq!(layout.square_width, 3);
        assert_eq!(layout.square_rect(7, 7), Rect::new(2 + 3 + 21, 1 + 1 + 7, 3, 1));
    }

    #[test]
    fn test_square_at_round_trips_square_rect() {
        let layout = BoardLayout::new(4, 2, 5, 2);
        for row in 0..8 {
            for col in 0..8 {
                let rect = layout.square_rect(row, col);
                assert_eq!(layout.square_at(rect.x, rect.y), Some((row, col)));
                assert_eq!(
                    layout.square_at(rect.x + rect.width - 1, rect.y + rect.height - 1),
                    Some((row, col))
                );
            }
        }
    }

    #[test]
    fn test_square_at_outside_board() {
        let layout = BoardLayout::new(4, 2, 5, 2);
        assert_eq!(layout.square_at(3, 2), None);
        assert_eq!(layout.square_at(4, 1), None);
        assert_eq!(layout.square_at(44, 2), None);
        assert_eq!(layout.square_at(4, 18), None);
        assert_eq!(BoardLayout::default().square_at(0, 0), None);
    }
}
