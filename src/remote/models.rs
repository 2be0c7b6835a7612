//! Wire types exchanged with the approval backend.

use serde::{Deserialize, Serialize};

use crate::workflow::{ActionPayload, DocumentReviewStatus, Stage, StageAction, StageActionRequest};

/// Body of `POST /subjects/{id}/transitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub stage: Stage,
    pub action: StageAction,
    #[serde(flatten)]
    pub payload: ActionPayload,
}

impl From<&StageActionRequest> for TransitionRequest {
    fn from(request: &StageActionRequest) -> Self {
        Self {
            stage: request.stage,
            action: request.action,
            payload: request.payload.clone(),
        }
    }
}

/// Body of `POST /subjects/{id}/documents/{document_id}/review`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReview {
    pub status: DocumentReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error body returned by the backend. Every field is optional because older
/// endpoints answer with a bare `{"error": "..."}` or plain text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message in the body, if any.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
