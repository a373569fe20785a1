//! Core domain types mirrored from the game server.
//!
//! The server owns the rules. Everything here is a faithful copy of what it
//! reports: an 8×8 grid of piece codes, whose turn it is, and the move
//! history. Piece codes follow the server's table: 0 is empty, 1–6 are white
//! {pawn, rook, knight, bishop, queen, king} and 7–12 are the black pieces in
//! the same order.

use std::collections::HashSet;
use std::fmt;

use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ClientError;

/// Number of ranks and files on the board.
pub const BOARD_SIZE: usize = 8;

/// Highest valid piece code.
pub const MAX_PIECE_CODE: u8 = 12;

/// Image names indexed by piece code. Index 0 (empty) has no image.
const ASSET_NAMES: [&str; 13] = [
    "",
    "white_pawn",
    "white_rook",
    "white_knight",
    "white_bishop",
    "white_queen",
    "white_king",
    "black_pawn",
    "black_rook",
    "black_knight",
    "black_bishop",
    "black_queen",
    "black_king",
];

/// Terminal glyphs indexed by piece code.
const GLYPHS: [char; 13] = [
    ' ', '♙', '♖', '♘', '♗', '♕', '♔', '♟', '♜', '♞', '♝', '♛', '♚',
];

/// A square on the board, zero-indexed (row, col).
///
/// Row 0 is black's back rank, as the server stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CoordinateWire")]
pub struct Coordinate {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct CoordinateWire {
    row: u8,
    col: u8,
}

impl TryFrom<CoordinateWire> for Coordinate {
    type Error = ClientError;

    fn try_from(wire: CoordinateWire) -> Result<Self, Self::Error> {
        Coordinate::new(wire.row, wire.col)
    }
}

impl Coordinate {
    /// Creates a coordinate, rejecting values outside 0..8.
    #[track_caller]
    pub fn new(row: u8, col: u8) -> Result<Self, ClientError> {
        if usize::from(row) >= BOARD_SIZE || usize::from(col) >= BOARD_SIZE {
            return Err(ClientError::invalid_input(format!(
                "Coordinate ({}, {}) is off the board",
                row, col
            )));
        }
        Ok(Self { row, col })
    }

    /// Row index (0 = black's back rank).
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column index (0 = the a-file).
    pub fn col(self) -> u8 {
        self.col
    }

    /// The square reached by mirroring both axes (`index → 7 − index`).
    pub fn mirrored(self) -> Self {
        let last = (BOARD_SIZE - 1) as u8;
        Self {
            row: last - self.row,
            col: last - self.col,
        }
    }

    /// All 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Coordinate { row, col }))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.col);
        let rank = BOARD_SIZE as u8 - self.row;
        write!(f, "{}{}", file, rank)
    }
}

/// One of the two sides.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// Moves first; codes 1–6.
    White,
    /// Codes 7–12.
    Black,
}

/// Kind of piece, in server code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PieceKind {
    /// Code offset 1.
    Pawn = 1,
    /// Code offset 2.
    Rook = 2,
    /// Code offset 3.
    Knight = 3,
    /// Code offset 4.
    Bishop = 4,
    /// Code offset 5.
    Queen = 5,
    /// Code offset 6.
    King = 6,
}

impl PieceKind {
    fn from_offset(offset: u8) -> Option<Self> {
        match offset {
            1 => Some(Self::Pawn),
            2 => Some(Self::Rook),
            3 => Some(Self::Knight),
            4 => Some(Self::Bishop),
            5 => Some(Self::Queen),
            6 => Some(Self::King),
            _ => None,
        }
    }
}

/// A decoded, non-empty piece code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, new)]
pub struct Piece {
    /// Owning side.
    pub side: Side,
    /// What the piece is.
    pub kind: PieceKind,
}

impl Piece {
    /// Decodes a piece code. Returns `None` for 0 and for out-of-range codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=6 => PieceKind::from_offset(code).map(|kind| Piece::new(Side::White, kind)),
            7..=12 => PieceKind::from_offset(code - 6).map(|kind| Piece::new(Side::Black, kind)),
            _ => None,
        }
    }

    /// Encodes back to the server's piece code.
    pub fn code(self) -> u8 {
        let offset = self.kind as u8;
        match self.side {
            Side::White => offset,
            Side::Black => offset + 6,
        }
    }

    /// Image name for this piece, e.g. `white_pawn`.
    ///
    /// This is the only piece-code-to-asset lookup; every front end draws
    /// pieces through it.
    pub fn asset_name(self) -> &'static str {
        ASSET_NAMES[usize::from(self.code())]
    }

    /// Relative image path used by graphical front ends.
    pub fn asset_path(self) -> String {
        format!("images/{}.png", self.asset_name())
    }

    /// Unicode chess glyph for terminal rendering.
    pub fn glyph(self) -> char {
        GLYPHS[usize::from(self.code())]
    }
}

/// 8×8 grid of piece codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct BoardState {
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

impl BoardState {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Self {
            cells: [[0; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// The standard opening position.
    pub fn initial() -> Self {
        Self {
            cells: [
                [8, 9, 10, 11, 12, 10, 9, 8],
                [7; BOARD_SIZE],
                [0; BOARD_SIZE],
                [0; BOARD_SIZE],
                [0; BOARD_SIZE],
                [0; BOARD_SIZE],
                [1; BOARD_SIZE],
                [2, 3, 4, 6, 5, 4, 3, 2],
            ],
        }
    }

    /// Builds a board from rows of piece codes, validating shape and range.
    #[instrument(skip(rows), fields(row_count = rows.len()))]
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, ClientError> {
        if rows.len() != BOARD_SIZE {
            return Err(ClientError::decode(format!(
                "Board has {} rows, expected {}",
                rows.len(),
                BOARD_SIZE
            )));
        }
        let mut cells = [[0; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != BOARD_SIZE {
                return Err(ClientError::decode(format!(
                    "Board row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    BOARD_SIZE
                )));
            }
            for (c, code) in row.into_iter().enumerate() {
                if code > MAX_PIECE_CODE {
                    return Err(ClientError::decode(format!(
                        "Board cell ({}, {}) holds invalid piece code {}",
                        r, c, code
                    )));
                }
                cells[r][c] = code;
            }
        }
        Ok(Self { cells })
    }

    /// Raw piece code at a square.
    pub fn code_at(&self, at: Coordinate) -> u8 {
        self.cells[usize::from(at.row())][usize::from(at.col())]
    }

    /// Piece at a square, if any.
    pub fn occupant(&self, at: Coordinate) -> Option<Piece> {
        Piece::from_code(self.code_at(at))
    }

    /// Places a piece code at a square.
    #[track_caller]
    pub fn set(&mut self, at: Coordinate, code: u8) -> Result<(), ClientError> {
        if code > MAX_PIECE_CODE {
            return Err(ClientError::invalid_input(format!(
                "Piece code {} out of range",
                code
            )));
        }
        self.cells[usize::from(at.row())][usize::from(at.col())] = code;
        Ok(())
    }

    /// Every occupied square with its piece, in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Coordinate, Piece)> + '_ {
        Coordinate::all().filter_map(|at| self.occupant(at).map(|piece| (at, piece)))
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

impl TryFrom<Vec<Vec<u8>>> for BoardState {
    type Error = ClientError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        BoardState::from_rows(rows)
    }
}

impl From<BoardState> for Vec<Vec<u8>> {
    fn from(board: BoardState) -> Self {
        board.cells.iter().map(|row| row.to_vec()).collect()
    }
}

/// A proposed move. Promotion and castling are inferred by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Move {
    /// Square the piece leaves.
    pub source: Coordinate,
    /// Square the piece lands on.
    pub target: Coordinate,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// One immutable entry of the move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MoveRecordWire")]
pub struct MoveRecord {
    piece: u8,
    captured: Option<u8>,
    #[serde(rename = "move")]
    mv: Move,
}

#[derive(Deserialize)]
struct MoveRecordWire {
    piece: u8,
    #[serde(default)]
    captured: Option<u8>,
    #[serde(rename = "move")]
    mv: Move,
}

impl From<MoveRecordWire> for MoveRecord {
    fn from(wire: MoveRecordWire) -> Self {
        MoveRecord::new(wire.piece, wire.captured, wire.mv)
    }
}

impl MoveRecord {
    /// Creates a record. A captured code of 0 means nothing was captured.
    pub fn new(piece: u8, captured: Option<u8>, mv: Move) -> Self {
        Self {
            piece,
            captured: captured.filter(|code| *code != 0),
            mv,
        }
    }

    /// Code of the piece that moved.
    pub fn piece_code(&self) -> u8 {
        self.piece
    }

    /// Code of the captured piece, if any.
    pub fn captured_code(&self) -> Option<u8> {
        self.captured
    }

    /// Decoded moving piece.
    pub fn piece(&self) -> Option<Piece> {
        Piece::from_code(self.piece)
    }

    /// Decoded captured piece.
    pub fn captured(&self) -> Option<Piece> {
        self.captured.and_then(Piece::from_code)
    }

    /// The move itself.
    pub fn mv(&self) -> Move {
        self.mv
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = self.piece().map(Piece::glyph).unwrap_or('?');
        match self.captured() {
            Some(taken) => write!(f, "{} {}x{} {}", glyph, self.mv.source, self.mv.target, taken.glyph()),
            None => write!(f, "{} {}", glyph, self.mv),
        }
    }
}

/// Which side(s) the local user may move.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlayerAssignment {
    /// Only white.
    White,
    /// Only black.
    Black,
    /// Both sides (hot-seat).
    #[default]
    Both,
}

impl PlayerAssignment {
    /// The single side, or `None` for `Both`.
    pub fn side(self) -> Option<Side> {
        match self {
            PlayerAssignment::White => Some(Side::White),
            PlayerAssignment::Black => Some(Side::Black),
            PlayerAssignment::Both => None,
        }
    }
}

/// Whose turn the server reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(from = "Option<Side>", into = "Option<Side>")]
#[strum(serialize_all = "lowercase")]
pub enum TurnIndicator {
    /// White to move.
    White,
    /// Black to move.
    Black,
    /// The server has not decided (no game, game over, or unknown).
    #[default]
    Undetermined,
}

impl TurnIndicator {
    /// The side to move, if determined.
    pub fn side(self) -> Option<Side> {
        match self {
            TurnIndicator::White => Some(Side::White),
            TurnIndicator::Black => Some(Side::Black),
            TurnIndicator::Undetermined => None,
        }
    }
}

impl From<Option<Side>> for TurnIndicator {
    fn from(side: Option<Side>) -> Self {
        match side {
            Some(Side::White) => TurnIndicator::White,
            Some(Side::Black) => TurnIndicator::Black,
            None => TurnIndicator::Undetermined,
        }
    }
}

impl From<TurnIndicator> for Option<Side> {
    fn from(turn: TurnIndicator) -> Self {
        turn.side()
    }
}

/// Targets the server accepts for one source piece, as of the moment it
/// was asked. Stale as soon as the board changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMoveSet {
    source: Coordinate,
    targets: HashSet<Coordinate>,
}

impl LegalMoveSet {
    /// Creates a set for `source`.
    pub fn new(source: Coordinate, targets: impl IntoIterator<Item = Coordinate>) -> Self {
        Self {
            source,
            targets: targets.into_iter().collect(),
        }
    }

    /// The piece these targets belong to.
    pub fn source(&self) -> Coordinate {
        self.source
    }

    /// Whether `target` is a legal destination.
    pub fn contains(&self, target: Coordinate) -> bool {
        self.targets.contains(&target)
    }

    /// Number of legal destinations.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the piece has no legal destinations.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates the legal destinations in no particular order.
    pub fn targets(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.targets.iter().copied()
    }
}
