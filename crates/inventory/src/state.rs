//! Adjustment state machine.

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::outcome::OverallStatus;

/// The state of one engine invocation.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Decrementing ──┬──► Done(FullSuccess)
///           │                   └──► Compensating ──► Done(CompensatedFailure | UncompensatedFailure)
///           └──► Restoring ──► Done(FullSuccess | UncompensatedFailure)
/// ```
///
/// No state is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AdjustmentState {
    /// Validated, no gateway call issued yet.
    #[default]
    Pending,

    /// The order's decrement batch is in flight.
    Decrementing,

    /// A cancellation's increment batch is in flight.
    Restoring,

    /// Reversing the successes of a partially failed decrement batch.
    Compensating,

    /// The invocation has finished (terminal state).
    Done(OverallStatus),
}

impl AdjustmentState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: &AdjustmentState) -> bool {
        use AdjustmentState::*;
        use OverallStatus::*;

        matches!(
            (self, next),
            (Pending, Decrementing)
                | (Pending, Restoring)
                | (Decrementing, Done(FullSuccess))
                | (Decrementing, Compensating)
                | (Compensating, Done(CompensatedFailure))
                | (Compensating, Done(UncompensatedFailure))
                | (Restoring, Done(FullSuccess))
                | (Restoring, Done(UncompensatedFailure))
        )
    }

    /// Moves to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: AdjustmentState) -> Result<(), InventoryError> {
        if !self.can_transition_to(&next) {
            return Err(InventoryError::InvalidTransition {
                from: *self,
                to: next,
            });
        }

        tracing::debug!(from = %self, to = %next, "adjustment state changed");
        *self = next;
        Ok(())
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AdjustmentState::Done(_))
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentState::Pending => "Pending",
            AdjustmentState::Decrementing => "Decrementing",
            AdjustmentState::Restoring => "Restoring",
            AdjustmentState::Compensating => "Compensating",
            AdjustmentState::Done(_) => "Done",
        }
    }
}

impl std::fmt::Display for AdjustmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentState::Done(status) => write!(f, "Done({status})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_pending() {
        assert_eq!(AdjustmentState::default(), AdjustmentState::Pending);
    }

    #[test]
    fn test_apply_paths() {
        let mut state = AdjustmentState::Pending;
        state.advance(AdjustmentState::Decrementing).unwrap();
        state
            .advance(AdjustmentState::Done(OverallStatus::FullSuccess))
            .unwrap();
        assert!(state.is_terminal());

        let mut state = AdjustmentState::Pending;
        state.advance(AdjustmentState::Decrementing).unwrap();
        state.advance(AdjustmentState::Compensating).unwrap();
        state
            .advance(AdjustmentState::Done(OverallStatus::UncompensatedFailure))
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_restore_cannot_be_compensated() {
        let mut state = AdjustmentState::Pending;
        state.advance(AdjustmentState::Restoring).unwrap();
        assert!(!state.can_transition_to(&AdjustmentState::Compensating));
        assert!(!state.can_transition_to(&AdjustmentState::Done(
            OverallStatus::CompensatedFailure
        )));
    }

    #[test]
    fn test_states_are_not_revisited() {
        let mut state = AdjustmentState::Pending;
        state.advance(AdjustmentState::Decrementing).unwrap();

        let result = state.advance(AdjustmentState::Decrementing);
        assert!(matches!(
            result,
            Err(InventoryError::InvalidTransition { .. })
        ));
        assert_eq!(state, AdjustmentState::Decrementing);
    }

    #[test]
    fn test_done_is_terminal() {
        let done = AdjustmentState::Done(OverallStatus::CompensatedFailure);
        assert!(!done.can_transition_to(&AdjustmentState::Pending));
        assert!(!done.can_transition_to(&AdjustmentState::Compensating));
        assert!(!AdjustmentState::Compensating.is_terminal());
    }

    #[test]
    fn test_full_success_cannot_skip_decrementing() {
        assert!(
            !AdjustmentState::Pending
                .can_transition_to(&AdjustmentState::Done(OverallStatus::FullSuccess))
        );
        assert!(!AdjustmentState::Decrementing.can_transition_to(&AdjustmentState::Done(
            OverallStatus::CompensatedFailure
        )));
    }

    #[test]
    fn test_display() {
        assert_eq!(AdjustmentState::Pending.to_string(), "Pending");
        assert_eq!(AdjustmentState::Compensating.to_string(), "Compensating");
        assert_eq!(
            AdjustmentState::Done(OverallStatus::FullSuccess).to_string(),
            "Done(FullSuccess)"
        );
    }
}
