//! The single control flow for one selected game.
//!
//! User actions and request completions both pass through
//! [`GameController`]. Requests run concurrently, but their effects are
//! applied one at a time, here, in the order the completions arrive.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use crate::config::ClientConfig;
use crate::dispatch::{ClientEvent, RefreshReason, RequestDispatcher};
use crate::drag::{DragMoveController, DragState};
use crate::error::ClientError;
use crate::polling::{TickOutcome, TurnPollingLoop};
use crate::render::{board_tiles, Tile};
use crate::service::GameService;
use crate::submission::MoveSubmissionService;
use crate::types::{Coordinate, Move};
use crate::view_model::BoardViewModel;

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// What was being attempted.
    pub title: String,
    /// What went wrong.
    pub message: String,
}

/// What [`GameController::step`] woke up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStep {
    /// A request completion was applied.
    Applied,
    /// The poll timer fired.
    Ticked(TickOutcome),
    /// No completion can arrive any more.
    Closed,
}

/// Owns the view model, drag controller, submission service and polling
/// loop of one game, and applies their request completions.
///
/// Selecting another game means building a new controller; the old view
/// model goes with the old controller.
#[derive(Debug)]
pub struct GameController {
    view_model: BoardViewModel,
    drag: DragMoveController,
    submission: MoveSubmissionService,
    polling: TurnPollingLoop,
    dispatcher: RequestDispatcher,
    events: mpsc::UnboundedReceiver<ClientEvent>,
    notifications: VecDeque<Notification>,
    poll_interval: Duration,
}

impl GameController {
    /// Creates the controller for `game` using the assignment, auto-respond,
    /// timeout and poll interval from `config`.
    #[instrument(skip(service, game, config), fields(game = %game.as_ref()))]
    pub fn new(service: Arc<dyn GameService>, game: impl AsRef<str>, config: &ClientConfig) -> Self {
        let (dispatcher, events) =
            RequestDispatcher::new(service, game.as_ref(), config.request_timeout());
        info!(player = %config.player(), auto_respond = *config.auto_respond(), "Game selected");
        Self {
            view_model: BoardViewModel::new(game, *config.player()),
            drag: DragMoveController::new(),
            submission: MoveSubmissionService::new(*config.auto_respond()),
            polling: TurnPollingLoop::new(),
            dispatcher,
            events,
            notifications: VecDeque::new(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Requests the first snapshot.
    #[instrument(skip(self), fields(game = %self.view_model.game()))]
    pub fn open(&self) {
        self.view_model
            .refresh(&self.dispatcher, RefreshReason::GameSelected);
    }

    /// View model.
    pub fn view_model(&self) -> &BoardViewModel {
        &self.view_model
    }

    /// Drag controller.
    pub fn drag(&self) -> &DragMoveController {
        &self.drag
    }

    /// Submission service.
    pub fn submission(&self) -> &MoveSubmissionService {
        &self.submission
    }

    /// Polling loop.
    pub fn polling(&self) -> &TurnPollingLoop {
        &self.polling
    }

    /// Interval the caller should drive [`GameController::poll_tick`] at.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Tiles for the current view, including drag highlight and last move.
    pub fn tiles(&self) -> Vec<Tile> {
        board_tiles(
            self.view_model.board(),
            self.view_model.orientation(),
            self.drag.session(),
            self.view_model.last_move().map(|record| record.mv()),
        )
    }

    /// Starts dragging the piece at `source`. Empty squares are ignored.
    #[instrument(skip(self), fields(source = %source))]
    pub fn begin_drag(&mut self, source: Coordinate) -> bool {
        self.drag
            .begin_drag(source, self.view_model.board(), &self.dispatcher)
    }

    /// Highlights `target` against the resolved legal-move set.
    #[instrument(skip(self), fields(target = %target))]
    pub fn hover_target(&mut self, target: Coordinate) {
        self.drag.hover_target(target);
    }

    /// Drops the dragged piece on `target`, submitting the move.
    #[instrument(skip(self), fields(target = %target))]
    pub fn drop_on(&mut self, target: Coordinate) -> Option<Move> {
        self.drag.drop_on(
            target,
            &mut self.submission,
            self.view_model.assignment(),
            &self.dispatcher,
        )
    }

    /// Ends the current drag, whatever its outcome.
    #[instrument(skip(self))]
    pub fn end_drag(&mut self) {
        self.drag.end_drag();
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.state() == DragState::Dragging
    }

    /// Requests a snapshot.
    #[instrument(skip(self), fields(game = %self.view_model.game()))]
    pub fn refresh(&self) {
        self.view_model
            .refresh(&self.dispatcher, RefreshReason::Requested);
    }

    /// Moves the history cursor to `ply`.
    #[instrument(skip(self))]
    pub fn select_ply(&self, ply: usize) -> bool {
        self.view_model.select_ply(ply, &self.dispatcher)
    }

    /// Moves the history cursor one step back (negative) or forward.
    #[instrument(skip(self))]
    pub fn step_history(&self, delta: isize) -> bool {
        let ply = self.view_model.neighbour_ply(delta);
        self.view_model.select_ply(ply, &self.dispatcher)
    }

    /// Flips the auto-respond option and returns the new value.
    #[instrument(skip(self))]
    pub fn toggle_auto_respond(&mut self) -> bool {
        let enabled = !self.submission.auto_respond();
        self.submission.set_auto_respond(enabled);
        enabled
    }

    /// Drives one polling tick.
    #[instrument(skip(self), fields(game = %self.view_model.game()))]
    pub fn poll_tick(&mut self) -> TickOutcome {
        self.polling.tick(&self.view_model, &self.dispatcher)
    }

    /// Oldest notification not yet dismissed.
    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.front()
    }

    /// All notifications not yet dismissed, oldest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Dismisses the oldest notification.
    #[instrument(skip(self))]
    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    /// Applies every completion that has already arrived. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next completion and applies it. Returns `false` if no
    /// completion can ever arrive.
    pub async fn process_next(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Fixed-interval timer for [`GameController::step`], firing first right
    /// away. A late tick is delayed rather than followed by a burst.
    pub fn poll_timer(&self) -> Interval {
        let mut timer = tokio::time::interval(self.poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }

    /// Waits for the next request completion or poll tick, whichever comes
    /// first, and handles it.
    ///
    /// Cancel-safe: dropping the future before it resolves loses neither a
    /// completion nor a tick.
    pub async fn step(&mut self, timer: &mut Interval) -> ControllerStep {
        enum Woke {
            Event(Option<ClientEvent>),
            Tick,
        }

        let woke = tokio::select! {
            event = self.events.recv() => Woke::Event(event),
            _ = timer.tick() => Woke::Tick,
        };
        match woke {
            Woke::Event(Some(event)) => {
                self.handle_event(event);
                ControllerStep::Applied
            }
            Woke::Event(None) => ControllerStep::Closed,
            Woke::Tick => ControllerStep::Ticked(self.poll_tick()),
        }
    }

    /// Applies one request completion.
    #[instrument(skip(self, event), fields(game = %self.view_model.game()))]
    pub fn handle_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::LegalMoves {
                session,
                source,
                result,
            } => match result {
                Ok(targets) => {
                    self.drag.resolve_legal_moves(session, source, targets);
                }
                Err(e) if self.drag.is_current(session) => {
                    self.notify("Could not load legal moves", &e);
                }
                Err(e) => debug!(error = %e, "Legal move failure for a discarded drag"),
            },

            ClientEvent::MoveSubmitted { mv, result } => {
                if let Err(e) =
                    self.submission
                        .on_submitted(mv, result, &self.view_model, &self.dispatcher)
                {
                    self.notify(&format!("Move {} was not accepted", mv), &e);
                }
            }

            ClientEvent::AutoReplied { result } => {
                if let Err(e) =
                    self.submission
                        .on_auto_replied(result, &self.view_model, &self.dispatcher)
                {
                    self.notify("Automated reply failed", &e);
                }
            }

            ClientEvent::Snapshot { reason, result } => {
                match result {
                    Ok(snapshot) => {
                        self.view_model.apply_snapshot(snapshot);
                        self.polling.on_snapshot_applied(reason, &self.view_model);
                    }
                    Err(e) => {
                        if reason == RefreshReason::TurnChanged {
                            self.polling.on_refresh_failed();
                        }
                        self.notify("Could not refresh the board", &e);
                    }
                }
                self.submission
                    .on_refresh_completed(reason, &self.dispatcher);
            }

            ClientEvent::TurnPolled { result } => {
                self.polling
                    .on_turn(result, &self.view_model, &self.dispatcher);
            }

            ClientEvent::CursorSet { ply, result } => {
                if let Err(e) = self
                    .view_model
                    .on_cursor_set(ply, result, &self.dispatcher)
                {
                    self.notify("Could not move through history", &e);
                }
            }
        }
    }

    fn notify(&mut self, title: &str, e: &ClientError) {
        error!(title, error = %e, "Notifying user");
        self.notifications.push_back(Notification {
            title: title.to_string(),
            message: e.user_message(),
        });
    }
}
