//! Drag-and-drop move proposal.
//!
//! A [`DragSession`] lives from `begin_drag` to `end_drag` and owns everything
//! a drag needs: the source square, the legal targets once the server has
//! answered, and the single highlighted target. Nothing survives the session.

use tracing::{debug, info, instrument};

use crate::dispatch::RequestDispatcher;
use crate::submission::MoveSubmissionService;
use crate::types::{BoardState, Coordinate, LegalMoveSet, Move, PlayerAssignment};

/// Identifies one drag session. Responses carry it so answers meant for a
/// discarded session can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DragSessionId(u64);

/// How a hovered target relates to the legal-move set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Legality {
    /// The server listed this target.
    Legal,
    /// The server did not list this target.
    Illegal,
}

/// The single highlighted target of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    /// Hovered square.
    pub target: Coordinate,
    /// Classification against the resolved set.
    pub legality: Legality,
}

/// Legal targets of a session, before and after the server answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegalTargets {
    /// Query still outstanding (or failed).
    Pending,
    /// Server answer.
    Resolved(LegalMoveSet),
}

/// State of one drag interaction.
#[derive(Debug, Clone)]
pub struct DragSession {
    id: DragSessionId,
    source: Coordinate,
    legal_targets: LegalTargets,
    highlight: Option<Highlight>,
}

impl DragSession {
    fn new(id: DragSessionId, source: Coordinate) -> Self {
        Self {
            id,
            source,
            legal_targets: LegalTargets::Pending,
            highlight: None,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> DragSessionId {
        self.id
    }

    /// Square the dragged piece came from.
    pub fn source(&self) -> Coordinate {
        self.source
    }

    /// Pending or resolved legal targets.
    pub fn legal_targets(&self) -> &LegalTargets {
        &self.legal_targets
    }

    /// Resolved set, if the server has answered.
    pub fn legal_move_set(&self) -> Option<&LegalMoveSet> {
        match &self.legal_targets {
            LegalTargets::Resolved(set) => Some(set),
            LegalTargets::Pending => None,
        }
    }

    /// Currently highlighted target.
    pub fn highlight(&self) -> Option<Highlight> {
        self.highlight
    }
}

/// Lifecycle of the drag controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A piece is being dragged.
    Dragging,
    /// The piece was dropped and its move submitted.
    Resolving,
}

/// Drives drag sessions: `Idle → Dragging → Resolving → Idle`.
#[derive(Debug, Default)]
pub struct DragMoveController {
    state: DragState,
    session: Option<DragSession>,
    next_id: u64,
}

impl DragMoveController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Active session, if any.
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Highlight of the active session.
    pub fn highlight(&self) -> Option<Highlight> {
        self.session.as_ref().and_then(DragSession::highlight)
    }

    /// Whether `id` names the active session.
    pub fn is_current(&self, id: DragSessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == id)
    }

    /// Starts dragging the piece at `source`.
    ///
    /// Does nothing and returns `false` when the square is empty. Otherwise
    /// replaces any previous session, asks for the legal targets without
    /// waiting, and enters `Dragging`.
    #[instrument(skip(self, board, dispatcher), fields(source = %source))]
    pub fn begin_drag(
        &mut self,
        source: Coordinate,
        board: &BoardState,
        dispatcher: &RequestDispatcher,
    ) -> bool {
        if board.occupant(source).is_none() {
            debug!("Drag from empty square ignored");
            return false;
        }

        self.next_id += 1;
        let id = DragSessionId(self.next_id);
        if let Some(previous) = self.session.replace(DragSession::new(id, source)) {
            debug!(previous = ?previous.id, "Discarding previous drag session");
        }
        self.state = DragState::Dragging;
        dispatcher.legal_moves(id, source);
        info!(session = ?id, "Drag started");
        true
    }

    /// Stores the legal targets for `id`. Answers for any other session are
    /// dropped. Returns whether the answer was stored.
    #[instrument(skip(self, targets), fields(count = targets.len()))]
    pub fn resolve_legal_moves(
        &mut self,
        id: DragSessionId,
        source: Coordinate,
        targets: Vec<Coordinate>,
    ) -> bool {
        match self.session.as_mut() {
            Some(session) if session.id == id => {
                session.legal_targets = LegalTargets::Resolved(LegalMoveSet::new(source, targets));
                debug!("Legal targets resolved");
                true
            }
            _ => {
                debug!("Legal targets for a discarded session ignored");
                false
            }
        }
    }

    /// Highlights `target` as legal or illegal.
    ///
    /// No effect unless dragging with a resolved set. The previous highlight
    /// is cleared before the new one is set.
    #[instrument(skip(self), fields(target = %target))]
    pub fn hover_target(&mut self, target: Coordinate) {
        if self.state != DragState::Dragging {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let legality = match session.legal_move_set() {
            Some(set) if set.contains(target) => Legality::Legal,
            Some(_) => Legality::Illegal,
            None => {
                debug!("Hover ignored, legal targets pending");
                return;
            }
        };
        if let Some(cleared) = session.highlight.take() {
            debug!(cleared = %cleared.target, "Cleared previous highlight");
        }
        session.highlight = Some(Highlight { target, legality });
        debug!(legality = %legality, "Target highlighted");
    }

    /// Drops the piece on `target` and submits the move.
    ///
    /// The move is submitted whether or not `target` is in the legal set;
    /// the server has the final word. Only valid while `Dragging`.
    #[instrument(skip(self, submission, dispatcher), fields(target = %target))]
    pub fn drop_on(
        &mut self,
        target: Coordinate,
        submission: &mut MoveSubmissionService,
        player: PlayerAssignment,
        dispatcher: &RequestDispatcher,
    ) -> Option<Move> {
        if self.state != DragState::Dragging {
            debug!(state = %self.state, "Drop ignored");
            return None;
        }
        let source = self.session.as_ref()?.source;
        let mv = Move::new(source, target);
        self.state = DragState::Resolving;
        submission.submit(mv, player, dispatcher);
        info!(mv = %mv, "Piece dropped");
        Some(mv)
    }

    /// Ends the drag whatever happened, clearing session and highlight.
    #[instrument(skip(self))]
    pub fn end_drag(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session = ?session.id, state = %self.state, "Drag ended");
        }
        self.state = DragState::Idle;
    }
}
