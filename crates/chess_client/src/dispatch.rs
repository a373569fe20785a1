//! Request dispatch and completion events.
//!
//! Every remote call runs as its own task. Its result comes back as a
//! [`ClientEvent`] on a single channel, and the owner of that channel applies
//! it. A component learns that a request took effect only by receiving its
//! event; nothing assumes an update is visible any earlier.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::drag::DragSessionId;
use crate::error::ClientError;
use crate::service::{GameService, GameSnapshot};
use crate::types::{Coordinate, Move, PlayerAssignment, TurnIndicator};

/// Why a snapshot was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RefreshReason {
    /// First load after a game is selected.
    GameSelected,
    /// The user asked for it.
    Requested,
    /// A submitted move was acknowledged.
    AfterSubmission,
    /// The automated opponent reply was acknowledged.
    AfterAutoReply,
    /// The polling loop saw the turn pass to the local player.
    TurnChanged,
    /// The history cursor moved.
    CursorMoved,
}

/// Completion of one remote request.
#[derive(Debug)]
pub enum ClientEvent {
    /// Legal targets for a drag session's source piece.
    LegalMoves {
        /// Drag session that asked.
        session: DragSessionId,
        /// Square the query was about.
        source: Coordinate,
        /// Server answer.
        result: Result<Vec<Coordinate>, ClientError>,
    },
    /// Acknowledgment of a submitted move.
    MoveSubmitted {
        /// The move that was proposed.
        mv: Move,
        /// Server answer.
        result: Result<(), ClientError>,
    },
    /// Acknowledgment of an automated reply request.
    AutoReplied {
        /// Server answer.
        result: Result<(), ClientError>,
    },
    /// A fetched snapshot.
    Snapshot {
        /// What triggered the fetch.
        reason: RefreshReason,
        /// Server answer.
        result: Result<GameSnapshot, ClientError>,
    },
    /// Answer to a whose-turn query.
    TurnPolled {
        /// Server answer.
        result: Result<TurnIndicator, ClientError>,
    },
    /// Acknowledgment of a history cursor change.
    CursorSet {
        /// Requested ply.
        ply: usize,
        /// Server answer.
        result: Result<(), ClientError>,
    },
}

/// Issues requests against one game and reports completions as events.
#[derive(Clone)]
pub struct RequestDispatcher {
    service: Arc<dyn GameService>,
    game: String,
    timeout: Duration,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("game", &self.game)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    /// Creates a dispatcher and the receiver its events arrive on.
    pub fn new(
        service: Arc<dyn GameService>,
        game: impl Into<String>,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            service,
            game: game.into(),
            timeout,
            events,
        };
        (dispatcher, rx)
    }

    /// Runs `call` in its own task, bounded by the timeout, and sends the
    /// event built by `wrap` when it finishes.
    fn spawn<T, F, Fut, W>(&self, label: &'static str, call: F, wrap: W)
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn GameService>, String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
        W: FnOnce(Result<T, ClientError>) -> ClientEvent + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let game = self.game.clone();
        let timeout = self.timeout;
        let events = self.events.clone();

        debug!(label, game = %game, "Dispatching request");
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, call(service, game)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(label, timeout_ms = timeout.as_millis() as u64, "Request timed out");
                    Err(ClientError::timeout(format!(
                        "{} gave no answer within {} ms",
                        label,
                        timeout.as_millis()
                    )))
                }
            };
            if events.send(wrap(result)).is_err() {
                debug!(label, "Event receiver gone, dropping response");
            }
        });
    }

    /// Queries legal targets for the piece at `source`.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn legal_moves(&self, session: DragSessionId, source: Coordinate) {
        self.spawn(
            "legal moves",
            move |service, game| async move { service.legal_moves(&game, source).await },
            move |result| ClientEvent::LegalMoves {
                session,
                source,
                result,
            },
        );
    }

    /// Submits a move on behalf of `player`.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn submit_move(&self, mv: Move, player: PlayerAssignment) {
        self.spawn(
            "submit move",
            move |service, game| async move { service.submit_move(&game, mv, player).await },
            move |result| ClientEvent::MoveSubmitted { mv, result },
        );
    }

    /// Asks the server to play the opponent's reply.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn request_auto_reply(&self) {
        self.spawn(
            "automated reply",
            |service, game| async move { service.request_auto_reply(&game).await },
            |result| ClientEvent::AutoReplied { result },
        );
    }

    /// Fetches the full snapshot.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn fetch_snapshot(&self, reason: RefreshReason) {
        self.spawn(
            "fetch snapshot",
            |service, game| async move { service.fetch_snapshot(&game).await },
            move |result| ClientEvent::Snapshot { reason, result },
        );
    }

    /// Asks whose turn it is.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn whose_turn(&self) {
        self.spawn(
            "whose turn",
            |service, game| async move { service.whose_turn(&game).await },
            |result| ClientEvent::TurnPolled { result },
        );
    }

    /// Moves the history view cursor.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn set_history_cursor(&self, ply: usize) {
        self.spawn(
            "set history cursor",
            move |service, game| async move { service.set_history_cursor(&game, ply).await },
            move |result| ClientEvent::CursorSet { ply, result },
        );
    }
}
