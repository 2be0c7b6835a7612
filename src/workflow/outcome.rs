//! Per-subject outcomes and the bulk report that collects them.

use std::collections::BTreeMap;

use serde::Serialize;

use super::models::SubjectId;
use super::stage_gate::GuardViolation;

/// Category of a failed stage action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "violation", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Workflow ordering or aggregate state forbids the action. Detected
    /// locally or classified from the remote error.
    GuardViolation(GuardViolation),
    /// Transport failure or an error the classifier does not recognize.
    RemoteFailure,
    /// The payload itself was rejected.
    ValidationError,
}

impl ErrorKind {
    /// Label used to group failures in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::GuardViolation(violation) => violation.code(),
            ErrorKind::RemoteFailure => "REMOTE_FAILURE",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
        }
    }
}

/// Result of one transition attempt on one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageActionOutcome {
    pub subject_id: SubjectId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub message: String,
}

impl StageActionOutcome {
    pub fn succeeded(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            success: true,
            error_kind: None,
            message: String::new(),
        }
    }

    pub fn failed(
        subject_id: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            success: false,
            error_kind: Some(kind),
            message: message.into(),
        }
    }

    /// A guard-violation failure whose message is the violation tag.
    pub fn guard_violation(subject_id: impl Into<String>, violation: GuardViolation) -> Self {
        Self::failed(subject_id, ErrorKind::GuardViolation(violation), violation.code())
    }

    pub fn remote_failure(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failed(subject_id, ErrorKind::RemoteFailure, message)
    }

    pub fn validation_error(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failed(subject_id, ErrorKind::ValidationError, message)
    }

    pub fn guard(&self) -> Option<GuardViolation> {
        match self.error_kind {
            Some(ErrorKind::GuardViolation(violation)) => Some(violation),
            _ => None,
        }
    }
}

/// Collected outcomes of a bulk action.
///
/// `outcomes` holds exactly one entry per requested subject, in completion
/// order. Callers that need input order must key by `subject_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkActionReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<StageActionOutcome>,
}

impl BulkActionReport {
    pub fn from_outcomes(outcomes: Vec<StageActionOutcome>) -> Self {
        let total = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            total,
            succeeded,
            failed: total - succeeded,
            outcomes,
        }
    }

    /// First outcome recorded for `subject_id`.
    pub fn outcome_for(&self, subject_id: &str) -> Option<&StageActionOutcome> {
        self.outcomes.iter().find(|o| o.subject_id == subject_id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StageActionOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Number of failures per error label, e.g. `{"DOCUMENTS_INCOMPLETE": 2,
    /// "REMOTE_FAILURE": 1}`.
    pub fn failure_breakdown(&self) -> BTreeMap<&'static str, usize> {
        let mut breakdown = BTreeMap::new();
        for kind in self.failures().filter_map(|o| o.error_kind) {
            *breakdown.entry(kind.label()).or_insert(0) += 1;
        }
        breakdown
    }
}

/// Returned instead of a report when a bulk action is cancelled.
///
/// Calls already dispatched keep running against the remote system; their
/// outcomes are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bulk action cancelled after dispatching {dispatched} of {total} subjects")]
pub struct BulkCancelled {
    pub dispatched: usize,
    pub total: usize,
}
