//! Executes a single stage action against the approval backend.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error_classifier::{classify, diagnostic_message};
use super::models::{DocumentReviewRequest, StageAction, StageActionRequest, Subject};
use super::outcome::{ErrorKind, StageActionOutcome};
use super::stage_gate::StageGate;
use crate::remote::{ApprovalApi, DocumentReview, RemoteError, TransitionRequest};

/// Applies one action to one subject.
///
/// Each call loads the subject, checks it against [`StageGate`] and, only if
/// allowed, issues exactly one mutating call. Errors never escape: every path
/// ends in a [`StageActionOutcome`]. Retries belong to the transport.
#[derive(Clone)]
pub struct StageTransitionExecutor {
    api: Arc<dyn ApprovalApi>,
}

impl StageTransitionExecutor {
    pub fn new(api: Arc<dyn ApprovalApi>) -> Self {
        Self { api }
    }

    /// Apply `request` and report what happened.
    pub async fn apply(&self, request: &StageActionRequest) -> StageActionOutcome {
        let subject_id = request.subject_id.as_str();

        let subject = match self.load_subject(subject_id).await {
            Ok(subject) => subject,
            Err(outcome) => return outcome,
        };

        let decision = StageGate::evaluate(&subject, request.stage, request.action);
        if let Some(violation) = decision.reason {
            info!(
                "Denied {} on {} for subject {}: {}",
                request.action, request.stage, subject_id, violation
            );
            return StageActionOutcome::guard_violation(subject_id, violation);
        }

        if let Err(message) = validate_payload(request) {
            info!(
                "Rejected {} on {} for subject {}: {}",
                request.action, request.stage, subject_id, message
            );
            return StageActionOutcome::validation_error(subject_id, message);
        }

        debug!(
            "Submitting {} on {} for subject {}",
            request.action, request.stage, subject_id
        );
        match self
            .api
            .transition(subject_id, &TransitionRequest::from(request))
            .await
        {
            Ok(()) => {
                info!(
                    "Applied {} on {} for subject {}",
                    request.action, request.stage, subject_id
                );
                StageActionOutcome::succeeded(subject_id)
            }
            Err(err) => classified_failure(subject_id, &err),
        }
    }

    /// Record a decision on a single document of a subject at the Documents stage.
    pub async fn review_document(&self, request: &DocumentReviewRequest) -> StageActionOutcome {
        let subject_id = request.subject_id.as_str();

        let subject = match self.load_subject(subject_id).await {
            Ok(subject) => subject,
            Err(outcome) => return outcome,
        };

        if let Some(violation) = StageGate::evaluate_document_review(&subject).reason {
            info!(
                "Denied review of document {} for subject {}: {}",
                request.document_id, subject_id, violation
            );
            return StageActionOutcome::guard_violation(subject_id, violation);
        }

        if subject.document(&request.document_id).is_none() {
            return StageActionOutcome::validation_error(
                subject_id,
                format!(
                    "document {} does not belong to subject {}",
                    request.document_id, subject_id
                ),
            );
        }

        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if request.decision.requires_reason() && reason.is_none() {
            return StageActionOutcome::validation_error(
                subject_id,
                "a reason is required to reject a document or request a replacement",
            );
        }

        let review = DocumentReview {
            status: request.decision.resulting_status(),
            reason: reason.map(str::to_string),
        };
        match self
            .api
            .review_document(subject_id, &request.document_id, &review)
            .await
        {
            Ok(()) => {
                info!(
                    "Marked document {} of subject {} as {}",
                    request.document_id,
                    subject_id,
                    review.status.as_str()
                );
                StageActionOutcome::succeeded(subject_id)
            }
            Err(err) => classified_failure(subject_id, &err),
        }
    }

    async fn load_subject(&self, subject_id: &str) -> Result<Subject, StageActionOutcome> {
        match self.api.get_subject(subject_id).await {
            Ok(subject) if subject.id == subject_id => Ok(subject),
            Ok(subject) => {
                warn!(
                    "Backend returned subject {} when asked for {}",
                    subject.id, subject_id
                );
                Err(StageActionOutcome::remote_failure(
                    subject_id,
                    format!("backend returned subject {} instead", subject.id),
                ))
            }
            Err(err) => {
                warn!("Failed to load subject {}: {}", subject_id, err);
                Err(StageActionOutcome::remote_failure(
                    subject_id,
                    diagnostic_message(&err),
                ))
            }
        }
    }
}

fn classified_failure(subject_id: &str, err: &RemoteError) -> StageActionOutcome {
    let kind = classify(err);
    match kind {
        ErrorKind::RemoteFailure => warn!("Remote failure for subject {}: {}", subject_id, err),
        _ => info!(
            "Backend refused action for subject {} ({}): {}",
            subject_id,
            kind.label(),
            err
        ),
    }
    StageActionOutcome::failed(subject_id, kind, diagnostic_message(err))
}

/// Local payload checks, run before any mutating call.
fn validate_payload(request: &StageActionRequest) -> Result<(), String> {
    if request.action.requires_reason() && request.payload.non_blank_reason().is_none() {
        return Err(format!("a reason is required to {}", describe(request.action)));
    }
    if request.action == StageAction::AssignRole && request.payload.role_ids.is_empty() {
        return Err("at least one role is required to assign roles".to_string());
    }
    Ok(())
}

fn describe(action: StageAction) -> &'static str {
    match action {
        StageAction::Approve => "approve a stage",
        StageAction::Reject => "reject a stage",
        StageAction::RequestChanges => "request changes",
        StageAction::AssignRole => "assign roles",
    }
}
