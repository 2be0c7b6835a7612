//! HTTP client for the approval backend.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::api::{ApprovalApi, RemoteError};
use super::models::{DocumentReview, ErrorBody, TransitionRequest};
use crate::workflow::Subject;

/// [`ApprovalApi`] over HTTP.
///
/// Endpoints:
/// - `GET {base}/subjects/{id}`
/// - `POST {base}/subjects/{id}/transitions`
/// - `POST {base}/subjects/{id}/documents/{document_id}/review`
#[derive(Clone)]
pub struct HttpApprovalApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpApprovalApi {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the approval backend (e.g., "http://localhost:8080/api")
    /// * `auth_token` - Bearer token attached to every request, if any
    /// * `timeout_secs` - Per-request timeout in seconds
    pub fn new(base_url: String, auth_token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        debug!("Approval backend answered {}: {}", status, text);
        Err(rejection(status, &text))
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout(err.to_string())
    } else if err.is_decode() {
        RemoteError::InvalidResponse(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

/// Build a rejection from a non-success response body, which may be JSON
/// `{code?, message?, error?}` or plain text.
fn rejection(status: u16, text: &str) -> RemoteError {
    let (code, message) = match serde_json::from_str::<ErrorBody>(text) {
        Ok(mut body) => {
            let code = body.code.take();
            (code, body.into_message())
        }
        Err(_) => (None, None),
    };

    let message = message.unwrap_or_else(|| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            format!("HTTP {}", status)
        } else {
            trimmed.to_string()
        }
    });

    RemoteError::Rejected {
        status,
        code,
        message,
    }
}

#[async_trait]
impl ApprovalApi for HttpApprovalApi {
    async fn get_subject(&self, subject_id: &str) -> Result<Subject, RemoteError> {
        let url = format!("{}/subjects/{}", self.base_url, subject_id);
        let response = self.send(self.client.get(&url)).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    async fn transition(
        &self,
        subject_id: &str,
        request: &TransitionRequest,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/subjects/{}/transitions", self.base_url, subject_id);
        self.send(self.client.post(&url).json(request)).await?;
        Ok(())
    }

    async fn review_document(
        &self,
        subject_id: &str,
        document_id: &str,
        review: &DocumentReview,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/subjects/{}/documents/{}/review",
            self.base_url, subject_id, document_id
        );
        self.send(self.client.post(&url).json(review)).await?;
        Ok(())
    }
}
