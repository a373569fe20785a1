//! Background detection of the local player's turn.

use tracing::{debug, info, instrument, warn};

use crate::dispatch::{RefreshReason, RequestDispatcher};
use crate::error::ClientError;
use crate::types::{PlayerAssignment, TurnIndicator};
use crate::view_model::BoardViewModel;

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TickOutcome {
    /// Guard not met: it is not the opponent's turn, or the user moves both sides.
    Inactive,
    /// A whose-turn query was issued.
    Queried,
    /// The previous query has not answered yet.
    SkippedInFlight,
    /// The turn change was seen and its refresh has not landed yet.
    AwaitingRefresh,
}

/// Polls whose turn it is while waiting for the opponent.
///
/// The caller drives ticks at a fixed interval for as long as the game is
/// shown. At most one query is in flight at a time.
#[derive(Debug, Default)]
pub struct TurnPollingLoop {
    query_in_flight: bool,
    refresh_pending: bool,
    queries_issued: u64,
}

impl TurnPollingLoop {
    /// Creates an idle loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether ticks should query: a single local side, a determined turn,
    /// and the turn belonging to the other side.
    pub fn is_active(turn: TurnIndicator, assignment: PlayerAssignment) -> bool {
        match (turn.side(), assignment.side()) {
            (Some(turn), Some(mine)) => turn != mine,
            _ => false,
        }
    }

    /// Whether a query is outstanding.
    pub fn query_in_flight(&self) -> bool {
        self.query_in_flight
    }

    /// Whether a triggered refresh has not landed yet.
    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Total queries issued.
    pub fn queries_issued(&self) -> u64 {
        self.queries_issued
    }

    /// One timer tick.
    #[instrument(skip(self, view_model, dispatcher))]
    pub fn tick(&mut self, view_model: &BoardViewModel, dispatcher: &RequestDispatcher) -> TickOutcome {
        if !Self::is_active(view_model.turn(), view_model.assignment()) {
            return TickOutcome::Inactive;
        }
        if self.query_in_flight {
            debug!("Previous turn query still outstanding, skipping tick");
            return TickOutcome::SkippedInFlight;
        }
        if self.refresh_pending {
            return TickOutcome::AwaitingRefresh;
        }
        self.query_in_flight = true;
        self.queries_issued += 1;
        dispatcher.whose_turn();
        TickOutcome::Queried
    }

    /// Handles a whose-turn answer. Triggers one refresh when the turn has
    /// passed to the local player. Errors are logged only.
    #[instrument(skip(self, result, view_model, dispatcher))]
    pub fn on_turn(
        &mut self,
        result: Result<TurnIndicator, ClientError>,
        view_model: &BoardViewModel,
        dispatcher: &RequestDispatcher,
    ) {
        self.query_in_flight = false;
        let reported = match result {
            Ok(turn) => turn,
            Err(e) => {
                warn!(error = %e, "Turn query failed");
                return;
            }
        };
        debug!(reported = %reported, "Turn reported");

        let mine = view_model.assignment().side();
        if reported.side().is_none() || reported.side() != mine {
            return;
        }
        if self.refresh_pending || !Self::is_active(view_model.turn(), view_model.assignment()) {
            debug!("Local view already caught up or refresh pending");
            return;
        }
        info!("Turn passed to local player, refreshing");
        self.refresh_pending = true;
        view_model.refresh(dispatcher, RefreshReason::TurnChanged);
    }

    /// A snapshot was applied to `view_model`.
    ///
    /// Only the refresh this loop triggered releases the latch, or a snapshot
    /// that already shows the local side to move. Snapshots fetched for other
    /// reasons may predate the turn change and leave it set.
    #[instrument(skip(self, view_model))]
    pub fn on_snapshot_applied(&mut self, reason: RefreshReason, view_model: &BoardViewModel) {
        if !self.refresh_pending {
            return;
        }
        if reason == RefreshReason::TurnChanged
            || !Self::is_active(view_model.turn(), view_model.assignment())
        {
            self.refresh_pending = false;
        } else {
            debug!("Snapshot predates the turn change, still awaiting refresh");
        }
    }

    /// The refresh this loop triggered failed; allow a later tick to retry.
    pub fn on_refresh_failed(&mut self) {
        self.refresh_pending = false;
    }
}
