//! Remote game service contract.

use async_trait::async_trait;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::types::{BoardState, Coordinate, Move, MoveRecord, PlayerAssignment, TurnIndicator};

/// Full authoritative view of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct GameSnapshot {
    /// Board as of the history cursor.
    pub board: BoardState,
    /// Side to move.
    #[serde(default)]
    pub turn: TurnIndicator,
    /// Every move played so far.
    #[serde(default)]
    pub history: Vec<MoveRecord>,
    /// Ply the board is showing (equal to `history.len()` when current).
    #[serde(default)]
    pub cursor: usize,
}

/// Operations the game server provides.
///
/// Every method either returns the server's answer or a [`ClientError`];
/// implementations must report server-side rejections and transport
/// failures through the same error path.
#[async_trait]
pub trait GameService: Send + Sync {
    /// Lists the names of all games.
    async fn list_games(&self) -> Result<Vec<String>, ClientError>;

    /// Creates a game.
    async fn create_game(&self, game: &str) -> Result<(), ClientError>;

    /// Deletes a game.
    async fn delete_game(&self, game: &str) -> Result<(), ClientError>;

    /// Fetches board, turn, history and cursor.
    async fn fetch_snapshot(&self, game: &str) -> Result<GameSnapshot, ClientError>;

    /// Asks whose turn it is.
    async fn whose_turn(&self, game: &str) -> Result<TurnIndicator, ClientError>;

    /// Asks where the piece at `source` may move.
    async fn legal_moves(&self, game: &str, source: Coordinate) -> Result<Vec<Coordinate>, ClientError>;

    /// Proposes a move on behalf of `player`.
    async fn submit_move(
        &self,
        game: &str,
        mv: Move,
        player: PlayerAssignment,
    ) -> Result<(), ClientError>;

    /// Asks the server to play the opponent's reply.
    async fn request_auto_reply(&self, game: &str) -> Result<(), ClientError>;

    /// Moves the history view cursor to `ply`.
    async fn set_history_cursor(&self, game: &str, ply: usize) -> Result<(), ClientError>;
}
