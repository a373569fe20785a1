//! Local mirror of one game's authoritative state.

use tracing::{debug, info, instrument, warn};

use crate::dispatch::{RefreshReason, RequestDispatcher};
use crate::error::ClientError;
use crate::render::Orientation;
use crate::service::GameSnapshot;
use crate::types::{BoardState, MoveRecord, PlayerAssignment, TurnIndicator};

/// Board, turn, history and cursor of the selected game, plus the locally
/// owned player assignment.
///
/// Snapshots replace the server-owned fields wholesale; nothing is merged.
/// Drag state is kept elsewhere and never touched here.
#[derive(Debug, Clone)]
pub struct BoardViewModel {
    game: String,
    board: BoardState,
    turn: TurnIndicator,
    assignment: PlayerAssignment,
    history: Vec<MoveRecord>,
    cursor: usize,
    snapshots_applied: u64,
}

impl BoardViewModel {
    /// Creates the view for a newly selected game. Shows the opening
    /// position until the first snapshot lands.
    #[instrument(skip(game), fields(game = %game.as_ref()))]
    pub fn new(game: impl AsRef<str>, assignment: PlayerAssignment) -> Self {
        info!("Creating board view model");
        Self {
            game: game.as_ref().to_string(),
            board: BoardState::initial(),
            turn: TurnIndicator::Undetermined,
            assignment,
            history: Vec::new(),
            cursor: 0,
            snapshots_applied: 0,
        }
    }

    /// Name of the game.
    pub fn game(&self) -> &str {
        &self.game
    }

    /// Board as last reported.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Turn as last reported.
    pub fn turn(&self) -> TurnIndicator {
        self.turn
    }

    /// Side(s) the local user moves.
    pub fn assignment(&self) -> PlayerAssignment {
        self.assignment
    }

    /// Move history as last reported.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// History cursor as last reported.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of snapshots applied since creation.
    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    /// Whether the board shows a past position.
    pub fn is_viewing_history(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// The move that produced the displayed position.
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.cursor.checked_sub(1).and_then(|i| self.history.get(i))
    }

    /// How the board should be drawn for this assignment and turn.
    pub fn orientation(&self) -> Orientation {
        Orientation::for_view(self.assignment, self.turn)
    }

    /// Requests a fresh snapshot. The view changes only when the snapshot
    /// event is applied.
    #[instrument(skip(self, dispatcher), fields(game = %self.game))]
    pub fn refresh(&self, dispatcher: &RequestDispatcher, reason: RefreshReason) {
        debug!("Refresh requested");
        dispatcher.fetch_snapshot(reason);
    }

    /// Replaces board, turn, history and cursor with `snapshot`.
    #[instrument(skip(self, snapshot), fields(game = %self.game, turn = %snapshot.turn, plies = snapshot.history.len()))]
    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        let GameSnapshot {
            board,
            turn,
            history,
            cursor,
        } = snapshot;
        self.board = board;
        self.turn = turn;
        self.cursor = cursor.min(history.len());
        self.history = history;
        self.snapshots_applied += 1;
        debug!(cursor = self.cursor, "Snapshot applied");
    }

    /// Asks the server to show the position after `ply` moves.
    ///
    /// Returns `false` without a request when `ply` is past the end of the
    /// history or already shown.
    #[instrument(skip(self, dispatcher), fields(game = %self.game))]
    pub fn select_ply(&self, ply: usize, dispatcher: &RequestDispatcher) -> bool {
        if ply > self.history.len() {
            debug!(plies = self.history.len(), "Ply out of range");
            return false;
        }
        if ply == self.cursor {
            return false;
        }
        dispatcher.set_history_cursor(ply);
        true
    }

    /// Ply one step from the cursor, clamped to the history.
    pub fn neighbour_ply(&self, delta: isize) -> usize {
        let target = self.cursor as isize + delta;
        target.clamp(0, self.history.len() as isize) as usize
    }

    /// Handles the cursor acknowledgment: success refreshes the view.
    #[instrument(skip(self, result, dispatcher), fields(game = %self.game))]
    pub fn on_cursor_set(
        &self,
        ply: usize,
        result: Result<(), ClientError>,
        dispatcher: &RequestDispatcher,
    ) -> Result<(), ClientError> {
        match result {
            Ok(()) => {
                self.refresh(dispatcher, RefreshReason::CursorMoved);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "History cursor rejected");
                Err(e)
            }
        }
    }
}
