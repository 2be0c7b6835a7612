//! Common test infrastructure
//!
//! End-to-end tests run the real HTTP client against a fake approval backend
//! served by axum on a random local port. Tests should only import from this
//! module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{fixtures, TestClient, TestServer, SUBJECT_1_ID};
//!
//! #[tokio::test]
//! async fn test_get_subject() {
//!     let server = TestServer::spawn(fixtures::standard_subjects()).await;
//!     let client = TestClient::new(&server);
//!
//!     let subject = client.api.get_subject(SUBJECT_1_ID).await.unwrap();
//!     assert_eq!(subject.id, SUBJECT_1_ID);
//! }
//! ```

#![allow(dead_code)]

mod client;
mod constants;
pub mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use server::{ScriptedResponse, TestServer};
