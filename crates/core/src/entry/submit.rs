//! Submission pipeline states.

use std::fmt;

use crate::{api::ApiError, models::DrawResult};

use super::flags::ValidationError;

/// Status text after the service accepted a draw.
pub const SUCCESS_MESSAGE: &str = "Submitted successfully!";
/// Status text after the service call failed.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error submitting result.";

/// Transient annotation shown under the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Nothing to report.
    #[default]
    Idle,
    /// The last submission was accepted.
    Success,
    /// Submit was refused locally for this reason.
    ValidationError(ValidationError),
    /// The service call failed.
    TransportError,
}

impl SubmissionStatus {
    /// No status is shown.
    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionStatus::Idle)
    }

    /// The status reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::ValidationError(_) | SubmissionStatus::TransportError
        )
    }

    /// Human-readable text, `None` while idle.
    pub fn message(&self) -> Option<String> {
        match self {
            SubmissionStatus::Idle => None,
            SubmissionStatus::Success => Some(SUCCESS_MESSAGE.to_string()),
            SubmissionStatus::ValidationError(reason) => Some(reason.to_string()),
            SubmissionStatus::TransportError => Some(TRANSPORT_ERROR_MESSAGE.to_string()),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message().unwrap_or_default())
    }
}

/// Whether a submission is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Submit may be pressed.
    #[default]
    Ready,
    /// Waiting on the service.
    CallingOut,
}

/// Identifies one submit attempt so late results can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A validated payload waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Hand this back to `finish_submit` with the outcome.
    pub ticket: Ticket,
    /// Validated, sorted payload.
    pub result: DrawResult,
}

/// Result of pressing submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    /// The payload is ready to be sent to the service.
    Dispatched(PendingSubmission),
    /// Validation failed; the reason is now the form's status.
    Rejected(ValidationError),
    /// A previous submission has not resolved yet.
    InFlight,
    /// The form has been closed.
    Closed,
}

/// How a finished submission was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The form was reset and `Submitted` emitted.
    Succeeded,
    /// The entry was kept and the status reports the failure.
    Failed,
    /// The ticket no longer matches the in-flight submission.
    Stale,
}

/// What the service call returned.
pub type SubmitOutcome = Result<(), ApiError>;
