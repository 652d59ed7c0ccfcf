//! API request handlers.

use crate::config::ValidationConfig;
use crate::error::{ApiError, ErrorResponse, MissingFieldsResponse};
use crate::models::{
    CreateTradeResponse, DeleteTradeResponse, HealthResponse, TradeInput, TradeResponse,
    TradesListResponse, UpdateTradeResponse,
};
use crate::state::AppState;
use crate::store::{TradeRecord, now_iso8601};
use axum::body::Bytes;
use axum::{BoxError, Json};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;


/// Parses a request body into a trade record.
///
/// An empty body and `null` count as "no data". `{}` is an object with no
/// fields and is left to field validation.
fn parse_trade_body(body: &[u8]) -> Result<TradeRecord, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyBody);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;

    match value {
        Value::Null => Err(ApiError::EmptyBody),
        Value::Object(map) => Ok(TradeRecord::from(map)),
        _ => Err(ApiError::NotAnObject),
    }
}

/// Checks the fields a new trade must carry.
fn validate_new_trade(trade: &TradeRecord, rules: &ValidationConfig) -> Result<(), ApiError> {
    let missing = trade.missing_fields(&rules.required_fields);
    if !missing.is_empty() {
        return Err(ApiError::MissingFields {
            missing,
            required: rules.required_fields.clone(),
        });
    }

    if rules.enforce_side {
        let side = trade.get("side");
        let accepted = side
            .and_then(Value::as_str)
            .is_some_and(|s| rules.valid_sides.iter().any(|v| v == s));
        if !accepted {
            return Err(ApiError::InvalidSide {
                side: side.map(display_value).unwrap_or_default(),
                valid: rules.valid_sides.clone(),
            });
        }
    }

    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Transaction Management API is running".to_string(),
        timestamp: now_iso8601(),
    })
}

// ============================================================================
// Trades
// ============================================================================

/// Create a trade.
#[utoipa::path(
    post,
    path = "/trades",
    request_body(content = TradeInput, description = "Trade fields; symbol, quantity, price and side are required"),
    responses(
        (status = 201, description = "Trade created", body = CreateTradeResponse),
        (status = 400, description = "Invalid body or missing fields", body = MissingFieldsResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Trades"
)]
pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateTradeResponse>), ApiError> {
    let mut trade = parse_trade_body(&body)?;
    validate_new_trade(&trade, &state.validation)?;

    let trade_id = state.store.save(&mut trade).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTradeResponse {
            message: "Trade created successfully".to_string(),
            trade_id,
            trade_data: trade,
        }),
    ))
}

/// Get a trade by ID.
#[utoipa::path(
    get,
    path = "/trades/{trade_id}",
    params(
        ("trade_id" = String, Path, description = "Trade identifier")
    ),
    responses(
        (status = 200, description = "Trade found", body = TradeResponse),
        (status = 404, description = "Trade not found", body = ErrorResponse),
        (status = 500, description = "Stored trade unreadable", body = ErrorResponse)
    ),
    tag = "Trades"
)]
pub async fn get_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
) -> Result<Json<TradeResponse>, ApiError> {
    let trade = state
        .store
        .get(&trade_id)
        .await?
        .ok_or_else(|| ApiError::TradeNotFound(trade_id.clone()))?;

    debug!(trade_id = %trade_id, "Trade fetched");

    Ok(Json(TradeResponse {
        message: "Trade found".to_string(),
        trade_data: trade,
    }))
}

/// List all trades.
#[utoipa::path(
    get,
    path = "/trades",
    responses(
        (status = 200, description = "All trades", body = TradesListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Trades"
)]
pub async fn list_trades(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TradesListResponse>, ApiError> {
    let trades = state.store.get_all().await?;
    let count = trades.len();

    Ok(Json(TradesListResponse {
        message: format!("Retrieved {count} trades"),
        count,
        trades,
    }))
}

/// Replace a trade.
///
/// The body becomes the whole record: fields not resent are dropped.
#[utoipa::path(
    put,
    path = "/trades/{trade_id}",
    params(
        ("trade_id" = String, Path, description = "Trade identifier")
    ),
    request_body(content = TradeInput, description = "Complete replacement field set"),
    responses(
        (status = 200, description = "Trade replaced", body = UpdateTradeResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Trade not found", body = ErrorResponse)
    ),
    tag = "Trades"
)]
pub async fn update_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdateTradeResponse>, ApiError> {
    if !state.store.contains(&trade_id).await? {
        return Err(ApiError::TradeNotFound(trade_id));
    }

    let trade = parse_trade_body(&body)?;

    // Re-checked under the identifier lock; a concurrent delete wins.
    let updated = state
        .store
        .replace(&trade_id, trade)
        .await?
        .ok_or_else(|| ApiError::TradeNotFound(trade_id.clone()))?;

    Ok(Json(UpdateTradeResponse {
        message: "Trade updated successfully".to_string(),
        trade_id,
        trade_data: updated,
    }))
}

/// Delete a trade.
#[utoipa::path(
    delete,
    path = "/trades/{trade_id}",
    params(
        ("trade_id" = String, Path, description = "Trade identifier")
    ),
    responses(
        (status = 200, description = "Trade deleted", body = DeleteTradeResponse),
        (status = 404, description = "Trade not found", body = ErrorResponse)
    ),
    tag = "Trades"
)]
pub async fn delete_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<String>,
) -> Result<Json<DeleteTradeResponse>, ApiError> {
    if state.store.delete(&trade_id).await? {
        Ok(Json(DeleteTradeResponse {
            message: "Trade deleted successfully".to_string(),
            trade_id,
        }))
    } else {
        Err(ApiError::TradeNotFound(trade_id))
    }
}

// ============================================================================
// Fallbacks
// ============================================================================

/// Fallback for paths with no route.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Renders errors raised by the request timeout layer.
pub async fn request_failed(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}
