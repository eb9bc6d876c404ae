//! Legal moves in the executor's internal state machine (spec §4.D),
//! grounded on the teacher's `can_transition_execution` /
//! `validate_execution_transition` pattern.

use crate::error::ExecutionError;
use crate::status::ExecutionStatus;

/// Whether `to` is a legal transition from `from`.
#[must_use]
pub fn can_transition_execution(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    use ExecutionStatus::{Cancelled, Failed, Idle, Running, Succeeded};

    matches!(
        (from, to),
        (Idle, Running)
            | (Running, Succeeded)
            | (Running, Failed)
            | (Running, Cancelled)
    )
}

/// Validate a transition, returning the error spec §4.D's state machine
/// forbids if it isn't legal.
pub fn validate_execution_transition(
    from: ExecutionStatus,
    to: ExecutionStatus,
) -> Result<(), ExecutionError> {
    if can_transition_execution(from, to) {
        Ok(())
    } else {
        Err(ExecutionError::InvalidTransition {
            from: from_label(from),
            to: from_label(to),
        })
    }
}

fn from_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Idle => "idle",
        ExecutionStatus::Running => "running",
        ExecutionStatus::Succeeded => "succeeded",
        ExecutionStatus::Failed => "failed",
        ExecutionStatus::Cancelled => "cancelled",
    }
}
