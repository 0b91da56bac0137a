//! HTTP boundary: the extractor behind `POST /parse`.
//!
//! Request and response bodies keep the original backend's field names
//! (`currentTime`, `localDate`, `startTime`, ...) so existing clients
//! keep working. CORS is wide open; preflight `OPTIONS` is answered by
//! the CORS layer, other methods on `/parse` get 405 from the router.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::candidate::EventCandidate;
use crate::context::ReferenceContext;
use crate::error::ExtractError;
use crate::oracle::{Oracle, extract_with_oracle};
use crate::extract;

/// Shared state accessible from handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Optional language-model fallback; `None` runs pure-deterministic.
    pub oracle: Option<Arc<dyn Oracle>>,
}

/// Build the router with all routes and layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/parse", post(parse_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    #[serde(default)]
    pub text: String,
    pub timezone: Option<String>,
    pub current_time: Option<String>,
    pub local_date: Option<String>,
    pub local_time: Option<String>,
}

async fn parse_handler(State(state): State<AppState>, Json(req): Json<ParseRequest>) -> Result<Json<EventCandidate>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "Missing text".to_string()));
    }

    let ctx = build_context(&req)?;
    tracing::debug!(timezone = %ctx.timezone, today = %ctx.today, "parse request");

    let candidate = match &state.oracle {
        Some(oracle) => extract_with_oracle(&req.text, &ctx, oracle.as_ref()).await,
        None => extract(&req.text, &ctx),
    }
    .map_err(ApiError::from)?;

    Ok(Json(candidate))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

fn build_context(req: &ParseRequest) -> Result<ReferenceContext, ApiError> {
    let instant = req
        .current_time
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| bad_request(format!("invalid currentTime {raw:?}")))
        })
        .transpose()?;

    let local_date = req
        .local_date
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| bad_request(format!("invalid localDate {raw:?}")))
        })
        .transpose()?;

    let local_time = req
        .local_time
        .as_deref()
        .map(|raw| {
            NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .map_err(|_| bad_request(format!("invalid localTime {raw:?}")))
        })
        .transpose()?;

    ReferenceContext::build(local_date, local_time, instant, req.timezone.as_deref()).map_err(ApiError::from)
}

fn bad_request(message: String) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, message)
}

/// An error with the status it maps to; rendered as `{"error": ...}`.
pub struct ApiError(StatusCode, String);

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        let status = match err {
            ExtractError::EmptyInput | ExtractError::InvalidDateArithmetic(_) => StatusCode::BAD_REQUEST,
            ExtractError::OracleTimeout => StatusCode::GATEWAY_TIMEOUT,
            ExtractError::OracleUnavailable(_) | ExtractError::OracleMalformedResponse(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(status, message) = self;
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use tower::ServiceExt;

    async fn send(router: Router, method: Method, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri("/parse");
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn parse_happy_path() {
        let body = serde_json::json!({
            "text": "tomorrow 5pm meeting with jack",
            "timezone": "America/New_York",
            "currentTime": "2025-01-06T14:00:00Z",
            "localDate": "2025-01-06",
            "localTime": "09:00",
        });
        let (status, json) = send(router(AppState::default()), Method::POST, Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "meeting with jack");
        assert_eq!(json["startTime"], "2025-01-07T17:00:00");
        assert_eq!(json["endTime"], serde_json::Value::Null);
        assert_eq!(json["location"], "");
    }

    #[tokio::test]
    async fn missing_text_is_bad_request() {
        let body = serde_json::json!({ "text": "" });
        let (status, json) = send(router(AppState::default()), Method::POST, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing text");
    }

    #[tokio::test]
    async fn invalid_local_date_is_bad_request() {
        let body = serde_json::json!({ "text": "lunch tomorrow", "localDate": "01/06/2025" });
        let (status, json) = send(router(AppState::default()), Method::POST, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("localDate"));
    }

    #[tokio::test]
    async fn options_on_parse_is_answered_permissively() {
        let (status, _) = send(router(AppState::default()), Method::OPTIONS, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn get_on_parse_is_method_not_allowed() {
        let (status, _) = send(router(AppState::default()), Method::GET, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router(AppState::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn range_request_round_trips_both_ends() {
        let body = serde_json::json!({
            "text": "client presentation 2-3pm in conference room A",
            "localDate": "2025-01-06",
        });
        let (status, json) = send(router(AppState::default()), Method::POST, Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["startTime"], "2025-01-06T14:00:00");
        assert_eq!(json["endTime"], "2025-01-06T15:00:00");
        assert_eq!(json["location"], "conference room A");
    }
}
