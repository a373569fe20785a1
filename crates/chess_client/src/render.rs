//! Front-end independent board layout.
//!
//! Front ends draw whatever [`board_tiles`] returns and map pointer
//! positions back through [`Orientation::from_display`]. Flipping is purely
//! presentational: stored coordinates never change.

use crate::drag::{DragSession, Legality};
use crate::types::{BoardState, Coordinate, Move, Piece, PlayerAssignment, TurnIndicator, BOARD_SIZE};

/// Which way up the board is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Orientation {
    /// Row 0 (black's back rank) at the top.
    #[default]
    WhiteAtBottom,
    /// Rows and columns mirrored; black at the bottom.
    BlackAtBottom,
}

impl Orientation {
    /// Black at the bottom for a black-only user, or for a user moving both
    /// sides while it is black's turn.
    pub fn for_view(assignment: PlayerAssignment, turn: TurnIndicator) -> Self {
        match (assignment, turn) {
            (PlayerAssignment::Black, _) => Orientation::BlackAtBottom,
            (PlayerAssignment::Both, TurnIndicator::Black) => Orientation::BlackAtBottom,
            _ => Orientation::WhiteAtBottom,
        }
    }

    /// Screen (row, col) a stored coordinate is drawn at.
    pub fn to_display(self, at: Coordinate) -> (u8, u8) {
        let shown = match self {
            Orientation::WhiteAtBottom => at,
            Orientation::BlackAtBottom => at.mirrored(),
        };
        (shown.row(), shown.col())
    }

    /// Stored coordinate under screen (row, col), if on the board.
    pub fn from_display(self, row: u8, col: u8) -> Option<Coordinate> {
        let shown = Coordinate::new(row, col).ok()?;
        Some(match self {
            Orientation::WhiteAtBottom => shown,
            Orientation::BlackAtBottom => shown.mirrored(),
        })
    }
}

/// Square colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// `(row + col)` even.
    Light,
    /// `(row + col)` odd.
    Dark,
}

/// Everything needed to draw one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Stored coordinate.
    pub coordinate: Coordinate,
    /// Screen row.
    pub display_row: u8,
    /// Screen column.
    pub display_col: u8,
    /// Square colour.
    pub shade: Shade,
    /// Piece on the square.
    pub piece: Option<Piece>,
    /// Drag highlight on this square.
    pub highlight: Option<Legality>,
    /// Whether the dragged piece came from here.
    pub drag_source: bool,
    /// Whether the last move started or ended here.
    pub last_move: bool,
}

/// Lays out all 64 squares in screen order (top-left first).
pub fn board_tiles(
    board: &BoardState,
    orientation: Orientation,
    drag: Option<&DragSession>,
    last_move: Option<Move>,
) -> Vec<Tile> {
    let highlight = drag.and_then(DragSession::highlight);
    let mut tiles = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
    for display_row in 0..BOARD_SIZE as u8 {
        for display_col in 0..BOARD_SIZE as u8 {
            let Some(coordinate) = orientation.from_display(display_row, display_col) else {
                continue;
            };
            let shade = if (coordinate.row() + coordinate.col()) % 2 == 0 {
                Shade::Light
            } else {
                Shade::Dark
            };
            tiles.push(Tile {
                coordinate,
                display_row,
                display_col,
                shade,
                piece: board.occupant(coordinate),
                highlight: highlight
                    .filter(|h| h.target == coordinate)
                    .map(|h| h.legality),
                drag_source: drag.is_some_and(|d| d.source() == coordinate),
                last_move: last_move
                    .is_some_and(|m| m.source == coordinate || m.target == coordinate),
            });
        }
    }
    tiles
}
