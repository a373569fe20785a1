//! Move submission and the optional automated reply.

use tracing::{debug, info, instrument, warn};

use crate::dispatch::{RefreshReason, RequestDispatcher};
use crate::error::ClientError;
use crate::types::{Move, PlayerAssignment};
use crate::view_model::BoardViewModel;

/// Submits moves and sequences the refreshes that follow them.
///
/// Each acknowledgment drives its own chain: submit → refresh → (automated
/// reply → refresh). Overlapping submissions are not serialized.
#[derive(Debug, Default)]
pub struct MoveSubmissionService {
    auto_respond: bool,
    submissions_in_flight: usize,
    auto_replies_in_flight: usize,
}

impl MoveSubmissionService {
    /// Creates the service.
    pub fn new(auto_respond: bool) -> Self {
        Self {
            auto_respond,
            ..Self::default()
        }
    }

    /// Whether an automated reply is requested after each move.
    pub fn auto_respond(&self) -> bool {
        self.auto_respond
    }

    /// Enables or disables the automated reply.
    #[instrument(skip(self))]
    pub fn set_auto_respond(&mut self, enabled: bool) {
        info!("Auto-respond changed");
        self.auto_respond = enabled;
    }

    /// Whether an automated reply is being computed.
    pub fn is_busy(&self) -> bool {
        self.auto_replies_in_flight > 0
    }

    /// Submissions awaiting acknowledgment.
    pub fn submissions_in_flight(&self) -> usize {
        self.submissions_in_flight
    }

    /// Sends `mv` to the server on behalf of `player`.
    #[instrument(skip(self, dispatcher), fields(mv = %mv, player = %player))]
    pub fn submit(&mut self, mv: Move, player: PlayerAssignment, dispatcher: &RequestDispatcher) {
        self.submissions_in_flight += 1;
        if self.submissions_in_flight > 1 {
            debug!(in_flight = self.submissions_in_flight, "Submitting while another submission is outstanding");
        }
        dispatcher.submit_move(mv, player);
    }

    /// Handles the submission acknowledgment.
    ///
    /// Success refreshes the view. Failure is returned for the caller to
    /// show; the view is left as it was.
    #[instrument(skip(self, result, view_model, dispatcher), fields(mv = %mv))]
    pub fn on_submitted(
        &mut self,
        mv: Move,
        result: Result<(), ClientError>,
        view_model: &BoardViewModel,
        dispatcher: &RequestDispatcher,
    ) -> Result<(), ClientError> {
        self.submissions_in_flight = self.submissions_in_flight.saturating_sub(1);
        match result {
            Ok(()) => {
                info!("Move acknowledged");
                view_model.refresh(dispatcher, RefreshReason::AfterSubmission);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Move rejected");
                Err(e)
            }
        }
    }

    /// Called once a refresh has completed, successfully or not.
    ///
    /// After the post-submission refresh, requests the automated reply when
    /// enabled and raises the busy indicator.
    #[instrument(skip(self, dispatcher))]
    pub fn on_refresh_completed(&mut self, reason: RefreshReason, dispatcher: &RequestDispatcher) {
        if reason != RefreshReason::AfterSubmission || !self.auto_respond {
            return;
        }
        self.auto_replies_in_flight += 1;
        info!("Requesting automated reply");
        dispatcher.request_auto_reply();
    }

    /// Handles the automated reply acknowledgment. The busy indicator is
    /// lowered either way; success refreshes the view.
    #[instrument(skip(self, result, view_model, dispatcher))]
    pub fn on_auto_replied(
        &mut self,
        result: Result<(), ClientError>,
        view_model: &BoardViewModel,
        dispatcher: &RequestDispatcher,
    ) -> Result<(), ClientError> {
        self.auto_replies_in_flight = self.auto_replies_in_flight.saturating_sub(1);
        match result {
            Ok(()) => {
                info!("Automated reply applied");
                view_model.refresh(dispatcher, RefreshReason::AfterAutoReply);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Automated reply failed");
                Err(e)
            }
        }
    }
}
