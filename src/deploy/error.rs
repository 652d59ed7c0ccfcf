//! Deployment receiver errors.

use crate::error::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Body returned when a deployment run cannot produce a result.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeployFailure {
    /// Always `"error"`.
    pub status: String,
    /// What went wrong.
    pub message: String,
}

/// Deployment receiver error types.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Signature header missing or wrong.
    #[error("Invalid signature")]
    InvalidSignature,

    /// No webhook secret is set, so no push can be authenticated.
    #[error("Webhook secret is not configured")]
    SecretNotConfigured,

    /// Payload missing, empty or not a JSON object.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Repository not on the allow-list.
    #[error("Unauthorized repository: {0}")]
    UnauthorizedRepository(String),

    /// Deployment script does not exist.
    #[error("Deployment script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// Script did not finish in time.
    #[error("Deployment timeout ({}s)", .0.as_secs())]
    Timeout(Duration),

    /// Script could not be started.
    #[error("Failed to run {}: {source}", .script.display())]
    Spawn {
        /// Script path.
        script: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl DeployError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeployError::InvalidSignature | DeployError::SecretNotConfigured => {
                StatusCode::UNAUTHORIZED
            }
            DeployError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            DeployError::UnauthorizedRepository(_) => StatusCode::FORBIDDEN,
            DeployError::ScriptNotFound(_)
            | DeployError::Timeout(_)
            | DeployError::Spawn { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DeployError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            DeployError::InvalidSignature => {
                tracing::warn!("Invalid webhook signature");
                client_error(status, "Invalid signature", self.to_string())
            }
            DeployError::SecretNotConfigured => {
                tracing::warn!("Rejecting webhook: WEBHOOK_SECRET is not set");
                client_error(status, "Invalid signature", self.to_string())
            }
            DeployError::InvalidPayload(detail) => {
                client_error(status, "No JSON payload", detail.clone())
            }
            DeployError::UnauthorizedRepository(repo) => {
                tracing::warn!(repo = %repo, "Webhook from unauthorized repository");
                client_error(
                    status,
                    "Unauthorized repository",
                    format!("Repository {repo} may not trigger deployments"),
                )
            }
            DeployError::ScriptNotFound(_)
            | DeployError::Timeout(_)
            | DeployError::Spawn { .. } => {
                tracing::error!(error = %self, "Deployment could not run");
                let body = DeployFailure {
                    status: "error".to_string(),
                    message: self.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

fn client_error(status: StatusCode, error: &str, message: String) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DeployError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DeployError::SecretNotConfigured.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DeployError::InvalidPayload("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DeployError::UnauthorizedRepository("a/b".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DeployError::Timeout(Duration::from_secs(600)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DeployError::ScriptNotFound(PathBuf::from("./deploy.sh")).to_string(),
            "Deployment script not found: ./deploy.sh"
        );
        assert_eq!(
            DeployError::Timeout(Duration::from_secs(600)).to_string(),
            "Deployment timeout (600s)"
        );
    }

    #[tokio::test]
    async fn test_unauthorized_repository_body() {
        let response = DeployError::UnauthorizedRepository("evil/repo".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Unauthorized repository");
    }

    #[tokio::test]
    async fn test_script_not_found_body() {
        let response = DeployError::ScriptNotFound(PathBuf::from("./missing.sh")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: DeployFailure = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "error");
        assert_eq!(body.message, "Deployment script not found: ./missing.sh");
    }
}
