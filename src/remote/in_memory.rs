//! In-process approval backend.
//!
//! Holds subjects in memory and applies transitions the way the real backend
//! does, including server-side re-validation. Failures and latency can be
//! injected per subject, which is what the tests and the CLI's fixture mode
//! rely on.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{ApprovalApi, RemoteError};
use super::models::{DocumentReview, TransitionRequest};
use crate::workflow::{GuardViolation, RoleRef, StageAction, StageGate, StageStatus, Subject};

pub struct InMemoryApprovalApi {
    subjects: Mutex<HashMap<String, Subject>>,
    transition_failures: Mutex<HashMap<String, RemoteError>>,
    latency: Duration,
    transition_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryApprovalApi {
    pub fn new(subjects: Vec<Subject>) -> Self {
        let subjects = subjects.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            subjects: Mutex::new(subjects),
            transition_failures: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
            transition_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Load subjects from a JSON file holding an array of subjects.
    pub fn from_fixture(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {:?}", path))?;
        let subjects: Vec<Subject> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture file: {:?}", path))?;
        Ok(Self::new(subjects))
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every transition on `subject_id` fail with `error`.
    pub async fn fail_transitions_for(&self, subject_id: &str, error: RemoteError) {
        self.transition_failures
            .lock()
            .await
            .insert(subject_id.to_string(), error);
    }

    /// Replace a stored subject, simulating a change by another reviewer.
    pub async fn put_subject(&self, subject: Subject) {
        self.subjects.lock().await.insert(subject.id.clone(), subject);
    }

    pub async fn subject(&self, subject_id: &str) -> Option<Subject> {
        self.subjects.lock().await.get(subject_id).cloned()
    }

    /// Number of transition calls received, failed ones included.
    pub fn transition_calls(&self) -> usize {
        self.transition_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_call(&self) -> InFlightGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlightGuard(&self.in_flight);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        guard
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn not_found(what: &str, id: &str) -> RemoteError {
    RemoteError::Rejected {
        status: 404,
        code: None,
        message: format!("{} {} not found", what, id),
    }
}

fn unprocessable(message: &str) -> RemoteError {
    RemoteError::Rejected {
        status: 422,
        code: None,
        message: message.to_string(),
    }
}

/// Server-side wording for a guard violation. The backend reports these as
/// free text, so the strings mirror what it sends.
fn guard_rejection(violation: GuardViolation) -> RemoteError {
    let message = match violation {
        GuardViolation::DocumentsIncomplete => {
            "Cannot approve documents stage: pending documents found".to_string()
        }
        GuardViolation::RoleAssignmentBlocked => {
            "Cannot assign role outside of the roles stage".to_string()
        }
        other => format!("Transition not allowed: {}", other.code()),
    };
    RemoteError::Rejected {
        status: 409,
        code: None,
        message,
    }
}

#[async_trait]
impl ApprovalApi for InMemoryApprovalApi {
    async fn get_subject(&self, subject_id: &str) -> Result<Subject, RemoteError> {
        let _call = self.simulate_call().await;
        self.subject(subject_id)
            .await
            .ok_or_else(|| not_found("Subject", subject_id))
    }

    async fn transition(
        &self,
        subject_id: &str,
        request: &TransitionRequest,
    ) -> Result<(), RemoteError> {
        let _call = self.simulate_call().await;
        self.transition_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.transition_failures.lock().await.get(subject_id) {
            return Err(error.clone());
        }

        let mut subjects = self.subjects.lock().await;
        let subject = subjects
            .get_mut(subject_id)
            .ok_or_else(|| not_found("Subject", subject_id))?;

        let decision = StageGate::evaluate(subject, request.stage, request.action);
        if let Some(violation) = decision.reason {
            return Err(guard_rejection(violation));
        }

        match request.action {
            StageAction::Approve | StageAction::AssignRole => {
                if request.action == StageAction::AssignRole {
                    if request.payload.role_ids.is_empty() {
                        return Err(unprocessable("at least one role is required"));
                    }
                    let roles = request.payload.role_ids.iter().map(|id| RoleRef {
                        id: id.clone(),
                        name: None,
                    });
                    subject.assigned_roles.extend(roles);
                }
                // The gate only lets advancing actions through on the stage
                // the subject is waiting on.
                match request.stage.next() {
                    Some(next) => {
                        subject.current_stage = next;
                        subject.stage_status = StageStatus::Pending;
                    }
                    None => {
                        subject.current_stage = request.stage;
                        subject.stage_status = StageStatus::Approved;
                    }
                }
            }
            StageAction::Reject | StageAction::RequestChanges => {
                if request.payload.non_blank_reason().is_none() {
                    return Err(unprocessable("reason is required"));
                }
                // Rejecting a stage sends the subject back to it.
                subject.current_stage = request.stage;
                subject.stage_status = if request.action == StageAction::Reject {
                    StageStatus::Rejected
                } else {
                    StageStatus::NotSubmitted
                };
            }
        }

        Ok(())
    }

    async fn review_document(
        &self,
        subject_id: &str,
        document_id: &str,
        review: &DocumentReview,
    ) -> Result<(), RemoteError> {
        let _call = self.simulate_call().await;

        let mut subjects = self.subjects.lock().await;
        let subject = subjects
            .get_mut(subject_id)
            .ok_or_else(|| not_found("Subject", subject_id))?;

        if let Some(violation) = StageGate::evaluate_document_review(subject).reason {
            return Err(guard_rejection(violation));
        }

        let document = subject
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| not_found("Document", document_id))?;
        document.review_status = review.status;
        Ok(())
    }
}
