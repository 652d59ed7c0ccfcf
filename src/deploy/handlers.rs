//! Deployment receiver request handlers.

use crate::deploy::config::{DeployConfig, image_for};
use crate::deploy::error::DeployError;
use crate::deploy::runner::{self, DeployRequest, ScriptRunner};
use crate::deploy::signature::{SIGNATURE_HEADER, verify_signature};
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};


/// Shared state for the deployment receiver.
#[derive(Debug)]
pub struct DeployState {
    /// Receiver settings.
    pub config: DeployConfig,
    /// Script runner.
    pub runner: ScriptRunner,
}

impl DeployState {
    /// Builds state from configuration.
    #[must_use]
    pub fn new(config: DeployConfig) -> Self {
        let runner = ScriptRunner::new(config.script.clone(), config.deploy_timeout);
        Self { config, runner }
    }
}

/// The subset of a GitHub push event the receiver reads.
#[derive(Debug, Default, Deserialize)]
pub struct PushEvent {
    /// Pushed ref, e.g. `refs/heads/main`.
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    /// Commit at the head of the push.
    #[serde(default)]
    pub after: String,
    /// Repository pushed to.
    #[serde(default)]
    pub repository: Option<Repository>,
    /// Head commit details.
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
}

/// Repository section of a push event.
#[derive(Debug, Default, Deserialize)]
pub struct Repository {
    /// `owner/name`.
    #[serde(default)]
    pub full_name: String,
}

/// Head commit section of a push event.
#[derive(Debug, Default, Deserialize)]
pub struct HeadCommit {
    /// Commit message.
    #[serde(default)]
    pub message: String,
}

/// Result of a deployment run.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentResponse {
    /// `"success"` or `"error"`.
    pub status: String,
    /// Summary.
    pub message: String,
    /// Short commit hash, for webhook deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Deployed image, for manual deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Script stdout on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Script stderr on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for a push that does not deploy.
#[derive(Debug, Serialize, Deserialize)]
pub struct SkippedResponse {
    /// Reason.
    pub message: String,
}

/// Receiver health.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiverHealth {
    /// Always `"healthy"`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Configured script path.
    pub deployment_script: String,
    /// Whether the script exists.
    pub script_exists: bool,
}

/// Host deployment status.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentStatus {
    /// Whether the script exists.
    pub deployment_script_exists: bool,
    /// Whether the docker daemon answers.
    pub docker_running: bool,
    /// Whether the API container is up.
    pub api_container_running: bool,
    /// Repositories allowed to deploy.
    pub allowed_repos: Vec<String>,
    /// Whether pushes can be authenticated.
    pub webhook_secret_configured: bool,
}

fn short_commit(sha: &str) -> String {
    sha.chars().take(8).collect()
}

/// Parses a webhook body, requiring a non-empty JSON object.
fn parse_push_event(body: &[u8]) -> Result<PushEvent, DeployError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DeployError::InvalidPayload(format!("Body is not valid JSON: {e}")))?;

    if !value.as_object().is_some_and(|map| !map.is_empty()) {
        return Err(DeployError::InvalidPayload(
            "Body must be a non-empty JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| DeployError::InvalidPayload(format!("Unexpected event shape: {e}")))
}

/// Handles a GitHub push webhook.
pub async fn github_webhook(
    State(state): State<Arc<DeployState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, DeployError> {
    let Some(secret) = &state.config.secret else {
        return Err(DeployError::SecretNotConfigured);
    };
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if !verify_signature(secret.as_bytes(), &body, signature) {
        return Err(DeployError::InvalidSignature);
    }

    let event = parse_push_event(&body)?;

    let repo_name = event
        .repository
        .map(|r| r.full_name)
        .unwrap_or_default();
    if !state.config.allowed_repos.contains(&repo_name) {
        return Err(DeployError::UnauthorizedRepository(repo_name));
    }

    if !state.config.allowed_branches.contains(&event.git_ref) {
        info!(git_ref = %event.git_ref, "Ignoring push to branch");
        let body = SkippedResponse {
            message: "Deployment skipped - not main/master branch".to_string(),
        };
        return Ok((StatusCode::OK, Json(body)).into_response());
    }

    let commit = short_commit(&event.after);
    let commit_message = event.head_commit.map(|c| c.message).unwrap_or_default();
    info!(repo = %repo_name, commit = %commit, message = %commit_message, "Received deployment webhook");

    let request = DeployRequest {
        commit_sha: event.after,
        docker_image: image_for(&repo_name),
        repo_name,
    };
    let outcome = state.runner.run(&request).await?;

    if outcome.success {
        info!(commit = %commit, "Deployment completed successfully");
        Ok(Json(DeploymentResponse {
            status: "success".to_string(),
            message: "Deployment completed successfully".to_string(),
            commit: Some(commit),
            image: None,
            output: Some(outcome.stdout),
            error: None,
        })
        .into_response())
    } else {
        error!(commit = %commit, exit_code = ?outcome.exit_code, stderr = %outcome.stderr, "Deployment failed");
        let body = DeploymentResponse {
            status: "error".to_string(),
            message: "Deployment failed".to_string(),
            commit: Some(commit),
            image: None,
            output: None,
            error: Some(outcome.stderr),
        };
        Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
    }
}

/// Triggers a deployment by hand, optionally naming the image.
pub async fn manual_deployment(
    State(state): State<Arc<DeployState>>,
    body: Bytes,
) -> Result<Response, DeployError> {
    let requested = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| DeployError::InvalidPayload(format!("Body is not valid JSON: {e}")))?;
        value
            .get("image")
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let image = requested
        .or_else(|| state.config.default_image())
        .ok_or_else(|| DeployError::InvalidPayload("No image given".to_string()))?;

    info!(image = %image, "Manual deployment triggered");

    let request = DeployRequest {
        commit_sha: "manual".to_string(),
        repo_name: "manual-deployment".to_string(),
        docker_image: image.clone(),
    };
    let outcome = state.runner.run(&request).await?;

    if outcome.success {
        Ok(Json(DeploymentResponse {
            status: "success".to_string(),
            message: "Manual deployment completed".to_string(),
            commit: None,
            image: Some(image),
            output: Some(outcome.stdout),
            error: None,
        })
        .into_response())
    } else {
        error!(image = %image, stderr = %outcome.stderr, "Manual deployment failed");
        let body = DeploymentResponse {
            status: "error".to_string(),
            message: "Manual deployment failed".to_string(),
            commit: None,
            image: None,
            output: None,
            error: Some(outcome.stderr),
        };
        Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
    }
}

/// Receiver health check.
pub async fn receiver_health(State(state): State<Arc<DeployState>>) -> Json<ReceiverHealth> {
    Json(ReceiverHealth {
        status: "healthy".to_string(),
        service: "webhook-receiver".to_string(),
        deployment_script: state.runner.script().display().to_string(),
        script_exists: state.runner.script_exists().await,
    })
}

/// Reports script presence, docker state and receiver settings.
pub async fn deployment_status(State(state): State<Arc<DeployState>>) -> Json<DeploymentStatus> {
    let (script_exists, docker_running, api_container_running) = tokio::join!(
        state.runner.script_exists(),
        runner::docker_running(),
        runner::container_running(&state.config.api_container),
    );

    Json(DeploymentStatus {
        deployment_script_exists: script_exists,
        docker_running,
        api_container_running,
        allowed_repos: state.config.allowed_repos.clone(),
        webhook_secret_configured: state.config.secret_configured(),
    })
}
