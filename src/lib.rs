//! Onboarding Approvals Library
//!
//! Staged approval workflow orchestration: gating rules, single-subject
//! transitions and bounded-concurrency bulk actions against a remote
//! approval backend.

pub mod config;
pub mod remote;
pub mod workflow;

// Re-export commonly used types for convenience
pub use remote::{ApprovalApi, HttpApprovalApi, InMemoryApprovalApi, RemoteError};
pub use workflow::{
    BulkActionExecutor, BulkActionReport, StageActionOutcome, StageGate, StageTransitionExecutor,
};
