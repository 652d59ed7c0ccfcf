//! Error types for the REST API.

use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;


/// API error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Short error title.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// Response body for a create request missing required fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MissingFieldsResponse {
    /// Short error title.
    pub error: String,
    /// Required fields absent from the request, in required order.
    pub missing_fields: Vec<String>,
    /// The full list of required fields.
    pub required_fields: Vec<String>,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body was empty.
    #[error("No JSON data provided")]
    EmptyBody,

    /// Request body was not valid JSON.
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    /// Request body was JSON but not an object.
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// Required fields are missing on create.
    #[error("Missing required fields: {}", missing.join(", "))]
    MissingFields {
        /// Fields that were absent.
        missing: Vec<String>,
        /// Every required field.
        required: Vec<String>,
    },

    /// `side` is not an accepted value.
    #[error("Invalid side: {side}")]
    InvalidSide {
        /// The rejected value.
        side: String,
        /// Accepted values.
        valid: Vec<String>,
    },

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No record exists under the identifier.
    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    /// No route matches the path.
    #[error("Endpoint not found")]
    RouteNotFound,

    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Persistence layer failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody
            | ApiError::InvalidJson(_)
            | ApiError::NotAnObject
            | ApiError::MissingFields { .. }
            | ApiError::InvalidSide { .. }
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TradeNotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the `{error, message}` body for every variant except
    /// [`ApiError::MissingFields`], which has its own shape.
    #[must_use]
    pub fn to_error_response(&self) -> ErrorResponse {
        let (error, message) = match self {
            ApiError::EmptyBody => (
                "No JSON data provided",
                "Request body must contain valid JSON".to_string(),
            ),
            ApiError::InvalidJson(detail) => (
                "Invalid JSON format",
                format!("Request body must contain valid JSON: {detail}"),
            ),
            ApiError::NotAnObject => (
                "Invalid JSON format",
                "Request body must be a JSON object".to_string(),
            ),
            ApiError::MissingFields { missing, .. } => (
                "Missing required fields",
                format!("Missing: {}", missing.join(", ")),
            ),
            ApiError::InvalidSide { side, valid } => (
                "Invalid side",
                format!("Side {side} is not one of: {}", valid.join(", ")),
            ),
            ApiError::InvalidRequest(detail) => ("Invalid request", detail.clone()),
            ApiError::TradeNotFound(trade_id) => (
                "Trade not found",
                format!("No trade found with ID: {trade_id}"),
            ),
            ApiError::RouteNotFound => (
                "Endpoint not found",
                "The requested endpoint does not exist".to_string(),
            ),
            ApiError::MethodNotAllowed => (
                "Method not allowed",
                "The request method is not allowed for this endpoint".to_string(),
            ),
            ApiError::Timeout => (
                "Request timeout",
                "The request took too long to complete".to_string(),
            ),
            ApiError::Storage(detail) | ApiError::Internal(detail) => {
                ("Internal server error", detail.clone())
            }
        };

        ErrorResponse {
            error: error.to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::MissingFields { missing, required } => {
                let body = Json(MissingFieldsResponse {
                    error: "Missing required fields".to_string(),
                    missing_fields: missing,
                    required_fields: required,
                });
                (status, body).into_response()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!("{}", other);
                }
                (status, Json(other.to_error_response())).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_client_error() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Storage(err.to_string())
        }
    }
}
