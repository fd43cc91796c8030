/// JSON HTTP surface for the picker UI.
///
/// - `GET /health`
/// - `GET /categories`
/// - `GET /categories/{name}`
/// - `GET /search?q=&category=&limit=`
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::AppError;
use crate::search::clamp_limit;
use crate::state::PickerState;
use faq_common::picker_api::{CategoryListResponse, QuestionListResponse, SearchQuestionsResponse};

pub fn router(state: PickerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/categories", get(categories))
        .route("/categories/{name}", get(category_questions))
        .route("/search", get(search))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: PickerState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(listen_addr = %addr, "HTTP picker API ready");
    }
    axum::serve(listener, router(state)).await
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn categories(State(state): State<PickerState>) -> Json<CategoryListResponse> {
    Json(state.list_categories().await)
}

async fn category_questions(
    State(state): State<PickerState>,
    Path(name): Path<String>,
) -> Result<Json<QuestionListResponse>, ApiError> {
    Ok(Json(state.list_questions(&name).await?))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    category: Option<String>,
    limit: Option<u32>,
}

async fn search(
    State(state): State<PickerState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchQuestionsResponse>, ApiError> {
    let Query(params) =
        params.map_err(|rejection| AppError::InvalidQuery(rejection.body_text()))?;
    let query = params.q.unwrap_or_default();
    let limit = clamp_limit(params.limit);
    Ok(Json(
        state
            .search(&query, params.category.as_deref(), limit)
            .await?,
    ))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::UnknownCategory(_) => StatusCode::NOT_FOUND,
            AppError::InvalidQuery(_) | AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "picker API request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
