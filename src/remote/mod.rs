//! Access to the approval backend, the system of record for subjects.
//!
//! The workflow core talks to the backend only through [`ApprovalApi`].
//! [`HttpApprovalApi`] is the production transport; [`InMemoryApprovalApi`]
//! backs tests and fixture runs.

mod api;
mod http_client;
mod in_memory;
mod models;

#[cfg(test)]
pub use api::MockApprovalApi;
pub use api::{ApprovalApi, RemoteError};
pub use http_client::HttpApprovalApi;
pub use in_memory::InMemoryApprovalApi;
pub use models::{DocumentReview, ErrorBody, TransitionRequest};
