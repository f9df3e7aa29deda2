//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::server::AppState;
use crate::error::FunnelError;
use crate::forecast::load_forecast;
use crate::report::load_period;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a pipeline failure
pub fn status_for(err: &FunnelError) -> StatusCode {
    match err {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        FunnelError::Fetch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: FunnelError) -> Response {
    let status = status_for(&err);
    warn!(%status, error = %err, "request failed");
    (status, Json(ApiResponse::<()>::err(err.to_string()))).into_response()
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn get(path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: "GET".to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Funnel API Server".to_string(),
        version: state.version.clone(),
        description: "Sales-funnel metrics per agency and group".to_string(),
        endpoints: vec![
            EndpointInfo::get("/health", "Health check endpoint"),
            EndpointInfo::get("/version", "Get server version"),
            EndpointInfo::get("/api/v1/periods", "List configured reporting periods"),
            EndpointInfo::get(
                "/api/v1/metrics/:period",
                "Funnel counts and conversion rates for a period",
            ),
            EndpointInfo::get(
                "/api/v1/forecast?agency=NAME",
                "Forecast block for one agency",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "periods".to_string(),
            "metrics".to_string(),
            "forecast".to_string(),
        ],
    }))
}

/// One configured reporting period
#[derive(Serialize)]
pub struct PeriodInfo {
    pub key: String,
    pub label: String,
    pub range: String,
}

/// GET /api/v1/periods - Configured periods
pub async fn periods(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let periods: Vec<PeriodInfo> = state
        .settings
        .periods
        .iter()
        .map(|p| PeriodInfo {
            key: p.key.clone(),
            label: p.label.clone(),
            range: p.range.clone(),
        })
        .collect();
    Json(ApiResponse::ok(periods))
}

/// GET /api/v1/metrics/:period - Funnel report for one period
pub async fn metrics(State(state): State<Arc<AppState>>, Path(period): Path<String>) -> Response {
    match load_period(state.source.as_ref(), &state.settings, &period).await {
        Ok(report) => Json(ApiResponse::ok(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Forecast query
#[derive(Deserialize)]
pub struct ForecastQuery {
    pub agency: Option<String>,
}

/// GET /api/v1/forecast - Forecast block for one agency
pub async fn forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Response {
    match load_forecast(
        state.source.as_ref(),
        &state.settings.forecast,
        query.agency.as_deref(),
    )
    .await
    {
        Ok(report) => Json(ApiResponse::ok(report)).into_response(),
        Err(e) => error_response(e),
    }
}
