//! Subjects loaded into the fake backend.

use onboarding_approvals::workflow::{
    Document, DocumentReviewStatus, RoleRef, Stage, StageStatus, Subject,
};

use super::constants::*;

fn documents(statuses: &[(&str, DocumentReviewStatus)]) -> Vec<Document> {
    statuses
        .iter()
        .map(|(id, status)| Document::new(*id, *status))
        .collect()
}

pub fn awaiting_details(id: &str) -> Subject {
    Subject::new(id, Stage::Details, StageStatus::Pending)
}

/// Two approved documents and one still pending.
pub fn documents_incomplete(id: &str) -> Subject {
    Subject::new(id, Stage::Documents, StageStatus::Pending).with_documents(documents(&[
        (PASSPORT_DOC_ID, DocumentReviewStatus::Approved),
        (CONTRACT_DOC_ID, DocumentReviewStatus::Approved),
        (TAX_FORM_DOC_ID, DocumentReviewStatus::Pending),
    ]))
}

pub fn documents_complete(id: &str) -> Subject {
    Subject::new(id, Stage::Documents, StageStatus::Pending).with_documents(documents(&[
        (PASSPORT_DOC_ID, DocumentReviewStatus::Approved),
        (CONTRACT_DOC_ID, DocumentReviewStatus::Approved),
    ]))
}

pub fn awaiting_roles(id: &str) -> Subject {
    Subject::new(id, Stage::Roles, StageStatus::Pending).with_documents(documents(&[(
        PASSPORT_DOC_ID,
        DocumentReviewStatus::Approved,
    )]))
}

pub fn awaiting_final(id: &str) -> Subject {
    let mut subject = awaiting_roles(id).with_roles(vec![RoleRef {
        id: ENGINEER_ROLE_ID.to_string(),
        name: Some("Engineer".to_string()),
    }]);
    subject.current_stage = Stage::Final;
    subject
}

/// One subject per stage, see the ids in `constants`.
pub fn standard_subjects() -> Vec<Subject> {
    vec![
        awaiting_details(SUBJECT_1_ID),
        documents_incomplete(SUBJECT_2_ID),
        awaiting_roles(SUBJECT_3_ID),
        awaiting_final(SUBJECT_4_ID),
        documents_complete(SUBJECT_5_ID),
    ]
}

/// `count` subjects waiting at the roles stage, ids `bulk-0`, `bulk-1`, ...
pub fn roles_batch(count: usize) -> Vec<Subject> {
    (0..count)
        .map(|i| awaiting_roles(&format!("bulk-{}", i)))
        .collect()
}
