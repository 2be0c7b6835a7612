//! Data models for the staged approval workflow.
//!
//! Defines subjects, stages, documents, and the requests that drive transitions.

use serde::{Deserialize, Serialize};

/// Identifier of a reviewable subject (an employee record in the HR domain).
pub type SubjectId = String;

/// The four ordered review stages a subject passes through.
///
/// Ordering follows declaration order, so `Stage::Details < Stage::Final`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Details,
    Documents,
    Roles,
    Final,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Details, Stage::Documents, Stage::Roles, Stage::Final];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Details => "DETAILS",
            Stage::Documents => "DOCUMENTS",
            Stage::Roles => "ROLES",
            Stage::Final => "FINAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DETAILS" => Some(Stage::Details),
            "DOCUMENTS" => Some(Stage::Documents),
            "ROLES" => Some(Stage::Roles),
            "FINAL" => Some(Stage::Final),
            _ => None,
        }
    }

    /// The stage that follows this one, or None for the final stage.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Details => Some(Stage::Documents),
            Stage::Documents => Some(Stage::Roles),
            Stage::Roles => Some(Stage::Final),
            Stage::Final => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review status of the subject's current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
}

/// Review status of a single uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentReviewStatus {
    Pending,
    Approved,
    Rejected,
    RequiresReplacement,
}

impl DocumentReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentReviewStatus::Pending => "PENDING",
            DocumentReviewStatus::Approved => "APPROVED",
            DocumentReviewStatus::Rejected => "REJECTED",
            DocumentReviewStatus::RequiresReplacement => "REQUIRES_REPLACEMENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(DocumentReviewStatus::Pending),
            "APPROVED" => Some(DocumentReviewStatus::Approved),
            "REJECTED" => Some(DocumentReviewStatus::Rejected),
            "REQUIRES_REPLACEMENT" => Some(DocumentReviewStatus::RequiresReplacement),
            _ => None,
        }
    }
}

/// A document uploaded for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub review_status: DocumentReviewStatus,
}

impl Document {
    pub fn new(id: impl Into<String>, review_status: DocumentReviewStatus) -> Self {
        Self {
            id: id.into(),
            review_status,
        }
    }
}

/// Reference to a role assigned to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Read-only projection of a subject as reported by the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub current_stage: Stage,
    pub stage_status: StageStatus,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub assigned_roles: Vec<RoleRef>,
}

impl Subject {
    /// Create a subject at the given stage with no documents or roles.
    pub fn new(id: impl Into<String>, current_stage: Stage, stage_status: StageStatus) -> Self {
        Self {
            id: id.into(),
            current_stage,
            stage_status,
            documents: Vec::new(),
            assigned_roles: Vec::new(),
        }
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_roles(mut self, roles: Vec<RoleRef>) -> Self {
        self.assigned_roles = roles;
        self
    }

    pub fn document(&self, document_id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == document_id)
    }
}

/// Action a reviewer can take on a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageAction {
    Approve,
    Reject,
    RequestChanges,
    AssignRole,
}

impl StageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageAction::Approve => "APPROVE",
            StageAction::Reject => "REJECT",
            StageAction::RequestChanges => "REQUEST_CHANGES",
            StageAction::AssignRole => "ASSIGN_ROLE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "APPROVE" => Some(StageAction::Approve),
            "REJECT" => Some(StageAction::Reject),
            "REQUEST_CHANGES" => Some(StageAction::RequestChanges),
            "ASSIGN_ROLE" => Some(StageAction::AssignRole),
            _ => None,
        }
    }

    /// Returns true for actions that move the subject forward through the stages.
    pub fn is_advancing(&self) -> bool {
        matches!(self, StageAction::Approve | StageAction::AssignRole)
    }

    /// Returns true for actions that must carry a reviewer-provided reason.
    pub fn requires_reason(&self) -> bool {
        matches!(self, StageAction::Reject | StageAction::RequestChanges)
    }
}

impl std::fmt::Display for StageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action-specific data sent along with a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    /// Reviewer's reason, required for reject and request-changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Roles to assign, required for assign-role.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role_ids: Vec<String>,
}

impl ActionPayload {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            role_ids: Vec::new(),
        }
    }

    pub fn with_roles(role_ids: Vec<String>) -> Self {
        Self {
            reason: None,
            role_ids,
        }
    }

    /// The reason, if present and not blank.
    pub fn non_blank_reason(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// A request to perform one action on one subject's stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageActionRequest {
    pub subject_id: SubjectId,
    pub stage: Stage,
    pub action: StageAction,
    pub payload: ActionPayload,
}

impl StageActionRequest {
    pub fn new(subject_id: impl Into<String>, stage: Stage, action: StageAction) -> Self {
        Self {
            subject_id: subject_id.into(),
            stage,
            action,
            payload: ActionPayload::default(),
        }
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// A reviewer's decision on a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentDecision {
    Approve,
    Reject,
    RequireReplacement,
}

impl DocumentDecision {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "APPROVE" => Some(DocumentDecision::Approve),
            "REJECT" => Some(DocumentDecision::Reject),
            "REQUIRE_REPLACEMENT" => Some(DocumentDecision::RequireReplacement),
            _ => None,
        }
    }

    /// The review status the document ends up in after this decision.
    pub fn resulting_status(&self) -> DocumentReviewStatus {
        match self {
            DocumentDecision::Approve => DocumentReviewStatus::Approved,
            DocumentDecision::Reject => DocumentReviewStatus::Rejected,
            DocumentDecision::RequireReplacement => DocumentReviewStatus::RequiresReplacement,
        }
    }

    pub fn requires_reason(&self) -> bool {
        !matches!(self, DocumentDecision::Approve)
    }
}

/// A request to review one document of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReviewRequest {
    pub subject_id: SubjectId,
    pub document_id: String,
    pub decision: DocumentDecision,
    pub reason: Option<String>,
}

impl DocumentReviewRequest {
    pub fn new(
        subject_id: impl Into<String>,
        document_id: impl Into<String>,
        decision: DocumentDecision,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            document_id: document_id.into(),
            decision,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
