//! Approval API client for end-to-end tests
//!
//! Wraps the production [`HttpApprovalApi`] pointed at a [`TestServer`] and
//! builds the executors on top of it.

use super::constants::*;
use super::server::TestServer;
use onboarding_approvals::workflow::{BulkActionExecutor, StageTransitionExecutor};
use onboarding_approvals::{ApprovalApi, HttpApprovalApi};
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct TestClient {
    /// The client as the workflow core sees it
    pub api: Arc<dyn ApprovalApi>,
}

impl TestClient {
    /// Creates a client authenticated with [`TEST_API_TOKEN`].
    pub fn new(server: &TestServer) -> Self {
        Self::with_timeout(server, 5)
    }

    /// Creates a client with a custom per-request timeout.
    pub fn with_timeout(server: &TestServer, timeout_secs: u64) -> Self {
        let api = HttpApprovalApi::new(
            server.api_url.clone(),
            Some(TEST_API_TOKEN.to_string()),
            timeout_secs,
        )
        .expect("Failed to build approval client");
        Self { api: Arc::new(api) }
    }

    pub fn executor(&self) -> StageTransitionExecutor {
        StageTransitionExecutor::new(self.api.clone())
    }

    pub fn bulk_executor(&self, concurrency_limit: usize) -> BulkActionExecutor {
        let limit = NonZeroUsize::new(concurrency_limit).expect("concurrency limit must be > 0");
        BulkActionExecutor::new(self.executor(), limit)
    }
}
