//! Trait abstraction over the approval backend.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{DocumentReview, TransitionRequest};
use crate::workflow::Subject;

/// Errors reported by an [`ApprovalApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote rejected request with status {status}: {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            RemoteError::Timeout(msg)
            | RemoteError::Transport(msg)
            | RemoteError::InvalidResponse(msg) => msg,
            RemoteError::Rejected { message, .. } => message,
        }
    }
}

/// Narrow call interface to the system of record.
///
/// Implementations own transport concerns (timeouts, auth headers, retries).
/// The workflow core only ever issues these calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApprovalApi: Send + Sync {
    /// Load the current projection of a subject.
    async fn get_subject(&self, subject_id: &str) -> Result<Subject, RemoteError>;

    /// Apply a stage transition to a subject.
    async fn transition(
        &self,
        subject_id: &str,
        request: &TransitionRequest,
    ) -> Result<(), RemoteError>;

    /// Record a review decision on one document.
    async fn review_document(
        &self,
        subject_id: &str,
        document_id: &str,
        review: &DocumentReview,
    ) -> Result<(), RemoteError>;
}
