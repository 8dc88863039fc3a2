use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::report::{NormalizeError, ParsedReport};
use crate::services::{ReportService, ReportServiceError, SendOutcome};

#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    /// Required `token` for `GET /report` when set.
    pub report_secret: Option<String>,
    pub max_upload_bytes: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub deleted: bool,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub data: ParsedReport,
    pub diagnostics: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: SendOutcome,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    pub to: Option<String>,
}

/// Error response rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<ReportServiceError> for ApiError {
    fn from(err: ReportServiceError) -> Self {
        let status = match &err {
            ReportServiceError::Normalize(NormalizeError::InvalidDocument(_))
            | ReportServiceError::InvalidRecipient => StatusCode::BAD_REQUEST,
            ReportServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReportServiceError::NoData | ReportServiceError::Digest(_) => StatusCode::NOT_FOUND,
            ReportServiceError::Normalize(NormalizeError::Schema(_))
            | ReportServiceError::Store(_)
            | ReportServiceError::Provider(_)
            | ReportServiceError::MailerNotConfigured
            | ReportServiceError::RecipientsNotConfigured
            | ReportServiceError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Request rejected: {}", err);
        }
        ApiError::new(status, err.to_string())
    }
}

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/data", get(get_data).post(post_data).delete(delete_data))
        .route(
            "/data/upload",
            post(upload_workbook).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/report", get(send_report))
        .route("/test-email", post(send_test_email))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_data(State(state): State<AppState>) -> Result<Json<ParsedReport>, ApiError> {
    let report = state
        .report_service
        .current_report()
        .await?
        .ok_or(ReportServiceError::NoData)?;

    debug!("Serving stored report with {} periods", report.months.len());
    Ok(Json(report))
}

#[instrument(skip(state, payload))]
async fn post_data(
    State(state): State<AppState>,
    payload: Result<Json<ParsedReport>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(report) = payload.map_err(|rejection| {
        warn!("Rejected report body: {}", rejection);
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    state.report_service.save_report(&report).await?;
    info!("Stored report posted as JSON");
    Ok(Json(OkResponse { ok: true }))
}

#[instrument(skip(state))]
async fn delete_data(State(state): State<AppState>) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.report_service.clear().await?;
    info!("Cleared stored report (existed: {})", deleted);
    Ok(Json(DeleteResponse { ok: true, deleted }))
}

#[instrument(skip(state, body), fields(bytes = body.len()))]
async fn upload_workbook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Request body is empty"));
    }

    let normalized = state.report_service.upload_workbook(body.to_vec()).await?;

    Ok(Json(UploadResponse {
        ok: true,
        diagnostics: normalized.diagnostics.iter().map(ToString::to_string).collect(),
        data: normalized.report,
    }))
}

#[instrument(skip(state, query))]
async fn send_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SendResponse>, ApiError> {
    if let Some(secret) = &state.report_secret {
        if query.token.as_deref() != Some(secret.as_str()) {
            warn!("Report trigger with invalid token");
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"));
        }
    }

    let today = Utc::now().date_naive();
    let outcome = state.report_service.send_weekly_report(today).await?;
    Ok(Json(SendResponse { ok: true, outcome }))
}

#[instrument(skip(state, payload))]
async fn send_test_email(
    State(state): State<AppState>,
    payload: Result<Json<TestEmailRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, ApiError> {
    let to = payload
        .ok()
        .and_then(|Json(request)| request.to)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "Request body must include { to: \"email@example.com\" }",
            )
        })?;

    let today = Utc::now().date_naive();
    let outcome = state.report_service.send_test_email(&to, today).await?;
    Ok(Json(SendResponse { ok: true, outcome }))
}
