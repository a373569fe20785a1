//! Cursor movement for keyboard navigation.

use chess_client::BOARD_SIZE;
use crossterm::event::KeyCode;

/// Screen position of the keyboard cursor, as (row, col) from the top-left.
pub type ScreenSquare = (u8, u8);

const LAST: u8 = BOARD_SIZE as u8 - 1;

/// Moves cursor based on arrow keys. Stops at the board edge.
pub fn move_cursor(cursor: ScreenSquare, key: KeyCode) -> ScreenSquare {
    let (row, col) = cursor;
    match key {
        KeyCode::Up => (row.saturating_sub(1), col),
        KeyCode::Down => (row.saturating_add(1).min(LAST), col),
        KeyCode::Left => (row, col.saturating_sub(1)),
        KeyCode::Right => (row, col.saturating_add(1).min(LAST)),
        _ => cursor,
    }
}

/// Whether `key` moves the cursor.
pub fn is_arrow(key: KeyCode) -> bool {
    matches!(key, KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right)
}
