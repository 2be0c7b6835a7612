//! Maps remote errors onto the workflow error taxonomy.
//!
//! The backend re-validates every transition, and a concurrent reviewer can
//! change a subject between the local gate check and the remote call. Such
//! rejections come back as free text (sometimes with a structured code), so
//! this is the only place that inspects raw error strings.

use super::outcome::ErrorKind;
use super::stage_gate::{GuardViolation, PendingReview};
use crate::remote::RemoteError;

/// Lowercase substrings recognized in remote error messages. Order matters:
/// the first marker found wins.
const GUARD_MARKERS: &[(&str, GuardViolation)] = &[
    (
        "pending_details_review",
        GuardViolation::PriorStageIncomplete(PendingReview::DetailsReview),
    ),
    (
        "pending_documents_review",
        GuardViolation::PriorStageIncomplete(PendingReview::DocumentsReview),
    ),
    (
        "pending_role_assignment",
        GuardViolation::PriorStageIncomplete(PendingReview::RoleAssignment),
    ),
    (
        "pending_final_approval",
        GuardViolation::PriorStageIncomplete(PendingReview::FinalApproval),
    ),
    ("stage_already_passed", GuardViolation::StageAlreadyPassed),
    ("documents_incomplete", GuardViolation::DocumentsIncomplete),
    ("pending documents", GuardViolation::DocumentsIncomplete),
    ("role_assignment_blocked", GuardViolation::RoleAssignmentBlocked),
    ("cannot assign role", GuardViolation::RoleAssignmentBlocked),
];

/// Find a guard-violation marker in a free-text message.
pub fn guard_violation_in(message: &str) -> Option<GuardViolation> {
    let message = message.to_lowercase();
    GUARD_MARKERS
        .iter()
        .find(|(marker, _)| message.contains(marker))
        .map(|(_, violation)| *violation)
}

/// Classify a remote error.
///
/// A structured code wins over the message text. A 400/422 rejection with no
/// guard marker is a payload problem. Everything else is a remote failure.
pub fn classify(error: &RemoteError) -> ErrorKind {
    if let RemoteError::Rejected {
        code: Some(code), ..
    } = error
    {
        if let Some(violation) = GuardViolation::from_code(code) {
            return ErrorKind::GuardViolation(violation);
        }
    }

    if let Some(violation) = guard_violation_in(error.message()) {
        return ErrorKind::GuardViolation(violation);
    }

    match error {
        RemoteError::Rejected {
            status: 400 | 422, ..
        } => ErrorKind::ValidationError,
        _ => ErrorKind::RemoteFailure,
    }
}

/// Message to keep alongside a classified error. Rejections keep the
/// backend's own text; transport errors keep their full description.
pub fn diagnostic_message(error: &RemoteError) -> String {
    match error {
        RemoteError::Rejected { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
