//! Staged approval workflow.
//!
//! Subjects move through four ordered review stages (Details, Documents,
//! Roles, Final). This module holds the pure gating rules, the document
//! aggregation they depend on, and the executors that apply reviewer actions
//! to one subject or to a batch.

mod bulk_executor;
mod document_aggregator;
mod error_classifier;
mod models;
mod outcome;
mod stage_gate;
mod transition_executor;

pub use bulk_executor::{BulkActionExecutor, DEFAULT_CONCURRENCY};
pub use document_aggregator::{DocumentAggregate, DocumentAggregator};
pub use error_classifier::{classify, diagnostic_message, guard_violation_in};
pub use models::*;
pub use outcome::{BulkActionReport, BulkCancelled, ErrorKind, StageActionOutcome};
pub use stage_gate::{Decision, GuardViolation, PendingReview, StageGate};
pub use transition_executor::StageTransitionExecutor;
