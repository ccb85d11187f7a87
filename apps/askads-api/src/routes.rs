use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use askads_service::{AskResponse, Error, IndexInfo, QueryRequest, RetrieveResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/index", get(index))
		.route("/v1/retrieve", post(retrieve))
		.route("/v1/ask", post(ask))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn index(State(state): State<AppState>) -> Json<IndexInfo> {
	Json(state.service.index_info())
}

async fn retrieve(
	State(state): State<AppState>,
	Json(payload): Json<QueryRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
	let response = state.service.retrieve(payload).await?;

	Ok(Json(response))
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<QueryRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let response = state.service.ask(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::Provider { message } => {
				tracing::error!(%message, "Upstream provider failed.");

				ApiError::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
			},
			Error::Index { message } => {
				tracing::error!(%message, "Vector index failed.");

				ApiError::new(StatusCode::BAD_GATEWAY, "INDEX_ERROR", message)
			},
			Error::Corpus { message } => {
				tracing::error!(%message, "Corpus lookup failed.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "CORPUS_ERROR", message)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
