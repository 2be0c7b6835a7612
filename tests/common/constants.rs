//! Shared constants for end-to-end tests
//!
//! When fixture data changes (subject ids, document ids, tokens), update only
//! this file.

// ============================================================================
// Subjects
// ============================================================================

/// Subject waiting on details review.
pub const SUBJECT_1_ID: &str = "emp-001";

/// Subject at the documents stage with one document still pending.
pub const SUBJECT_2_ID: &str = "emp-002";

/// Subject at the roles stage.
pub const SUBJECT_3_ID: &str = "emp-003";

/// Subject at the final stage.
pub const SUBJECT_4_ID: &str = "emp-004";

/// Subject at the documents stage with every document approved.
pub const SUBJECT_5_ID: &str = "emp-005";

/// Id the fake backend does not know.
pub const UNKNOWN_SUBJECT_ID: &str = "emp-404";

// ============================================================================
// Documents
// ============================================================================

pub const PASSPORT_DOC_ID: &str = "doc-passport";
pub const CONTRACT_DOC_ID: &str = "doc-contract";
pub const TAX_FORM_DOC_ID: &str = "doc-tax-form";

// ============================================================================
// Roles and auth
// ============================================================================

pub const ENGINEER_ROLE_ID: &str = "role-engineer";

pub const TEST_API_TOKEN: &str = "test-token-123";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the fake backend to accept requests.
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Client timeout used by tests that exercise slow responses.
pub const SHORT_CLIENT_TIMEOUT_SEC: u64 = 1;
