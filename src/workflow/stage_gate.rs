//! Local stage-ordering rules.
//!
//! The gate is a pure function of the subject projection and the requested
//! action. It never performs I/O; the remote system re-validates anyway, so a
//! gate ALLOW is a pre-check, not a guarantee.

use serde::{Deserialize, Serialize};

use super::document_aggregator::DocumentAggregator;
use super::models::{Stage, StageAction, StageStatus, Subject};

/// The review that has to finish before the requested stage opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingReview {
    DetailsReview,
    DocumentsReview,
    RoleAssignment,
    FinalApproval,
}

impl PendingReview {
    /// The pending review that blocks everything after `stage`.
    pub fn blocking(stage: Stage) -> Self {
        match stage {
            Stage::Details => PendingReview::DetailsReview,
            Stage::Documents => PendingReview::DocumentsReview,
            Stage::Roles => PendingReview::RoleAssignment,
            Stage::Final => PendingReview::FinalApproval,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PendingReview::DetailsReview => "PENDING_DETAILS_REVIEW",
            PendingReview::DocumentsReview => "PENDING_DOCUMENTS_REVIEW",
            PendingReview::RoleAssignment => "PENDING_ROLE_ASSIGNMENT",
            PendingReview::FinalApproval => "PENDING_FINAL_APPROVAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING_DETAILS_REVIEW" => Some(PendingReview::DetailsReview),
            "PENDING_DOCUMENTS_REVIEW" => Some(PendingReview::DocumentsReview),
            "PENDING_ROLE_ASSIGNMENT" => Some(PendingReview::RoleAssignment),
            "PENDING_FINAL_APPROVAL" => Some(PendingReview::FinalApproval),
            _ => None,
        }
    }
}

/// Reason a stage action is not permitted by workflow ordering or aggregate
/// state. The presentation layer maps each variant to reviewer-facing copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "violation", content = "pending", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardViolation {
    StageAlreadyPassed,
    PriorStageIncomplete(PendingReview),
    DocumentsIncomplete,
    RoleAssignmentBlocked,
}

impl GuardViolation {
    /// Stable tag for this violation. Prior-stage violations use the tag of
    /// the missing review so callers can tell which stage is outstanding.
    pub fn code(&self) -> &'static str {
        match self {
            GuardViolation::StageAlreadyPassed => "STAGE_ALREADY_PASSED",
            GuardViolation::PriorStageIncomplete(pending) => pending.as_str(),
            GuardViolation::DocumentsIncomplete => "DOCUMENTS_INCOMPLETE",
            GuardViolation::RoleAssignmentBlocked => "ROLE_ASSIGNMENT_BLOCKED",
        }
    }

    /// Parse a tag produced by [`GuardViolation::code`] or by the remote API.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "STAGE_ALREADY_PASSED" => Some(GuardViolation::StageAlreadyPassed),
            "DOCUMENTS_INCOMPLETE" => Some(GuardViolation::DocumentsIncomplete),
            "ROLE_ASSIGNMENT_BLOCKED" => Some(GuardViolation::RoleAssignmentBlocked),
            other => PendingReview::from_str(other).map(GuardViolation::PriorStageIncomplete),
        }
    }
}

impl std::fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allow: bool,
    pub reason: Option<GuardViolation>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allow: true,
            reason: None,
        }
    }

    pub fn deny(reason: GuardViolation) -> Self {
        Self {
            allow: false,
            reason: Some(reason),
        }
    }
}

pub struct StageGate;

impl StageGate {
    /// Decide whether `action` on `requested_stage` is permitted for `subject`.
    ///
    /// Rules are checked in order and the first match wins:
    /// 1. an advancing action on a stage the subject already passed (or on an
    ///    approved Final stage) is `STAGE_ALREADY_PASSED`;
    /// 2. any action beyond the stage the subject is waiting on is
    ///    `PRIOR_STAGE_INCOMPLETE`, naming that review;
    /// 3. assigning roles outside the Roles stage is `ROLE_ASSIGNMENT_BLOCKED`;
    /// 4. approving Documents without a complete document set is
    ///    `DOCUMENTS_INCOMPLETE`;
    /// 5. everything else is allowed.
    pub fn evaluate(subject: &Subject, requested_stage: Stage, action: StageAction) -> Decision {
        let advancing = action.is_advancing();
        if let Some(violation) = Self::check_ordering(subject, requested_stage, advancing) {
            return Decision::deny(violation);
        }

        if action == StageAction::AssignRole && requested_stage != Stage::Roles {
            return Decision::deny(GuardViolation::RoleAssignmentBlocked);
        }

        if requested_stage == Stage::Documents && action == StageAction::Approve {
            let aggregate = DocumentAggregator::compute(&subject.documents);
            if !aggregate.complete {
                return Decision::deny(GuardViolation::DocumentsIncomplete);
            }
        }

        Decision::allow()
    }

    /// Decide whether a single document of `subject` may be reviewed.
    ///
    /// Document reviews happen only while the subject sits at the Documents
    /// stage and that stage is not already approved.
    pub fn evaluate_document_review(subject: &Subject) -> Decision {
        match Self::check_ordering(subject, Stage::Documents, true) {
            Some(violation) => Decision::deny(violation),
            None => Decision::allow(),
        }
    }

    /// The stage the subject is effectively waiting on. An approved stage
    /// hands over to the next one; an approved Final stage stays put.
    pub fn effective_stage(subject: &Subject) -> Stage {
        let current = subject.current_stage;
        match subject.stage_status {
            StageStatus::Approved => current.next().unwrap_or(current),
            _ => current,
        }
    }

    fn check_ordering(
        subject: &Subject,
        requested_stage: Stage,
        advancing: bool,
    ) -> Option<GuardViolation> {
        let effective = Self::effective_stage(subject);

        if advancing {
            let final_approved = requested_stage == effective
                && subject.current_stage == effective
                && subject.stage_status == StageStatus::Approved;
            if requested_stage < effective || final_approved {
                return Some(GuardViolation::StageAlreadyPassed);
            }
        }

        if requested_stage > effective {
            return Some(GuardViolation::PriorStageIncomplete(PendingReview::blocking(effective)));
        }

        None
    }
}
