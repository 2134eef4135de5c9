//! HTTP handlers for the paste API.
//!
//! Store access is synchronous file IO, so every lifecycle call runs under
//! `spawn_blocking` to keep it off the async workers.

use std::fmt::{self, Display};
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pastebox_common::{CreatePasteRequest, CreatePasteResponse, Error, PasteSummary};
use tokio::task;
use tracing::{error, instrument};

use crate::lifecycle::ReadOutcome;
use crate::Manager;

/// Wrapper mapping domain errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(Error);

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

#[instrument(skip(manager), err)]
pub async fn create(
    Extension(manager): Extension<Arc<Manager>>,
    Json(request): Json<CreatePasteRequest>,
) -> Result<Json<CreatePasteResponse>, ApiError> {
    let id = run_blocking(move || manager.create(request)).await?;
    Ok(Json(CreatePasteResponse { id }))
}

#[instrument(skip(manager), err)]
pub async fn read(
    Extension(manager): Extension<Arc<Manager>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match run_blocking(move || manager.read(&id)).await? {
        ReadOutcome::Found(paste) => Ok(Json(paste).into_response()),
        // Expired is not deleted: the record persists but reads are refused.
        ReadOutcome::Expired => Ok(StatusCode::GONE.into_response()),
        ReadOutcome::NotFound => Err(ApiError(Error::NotFound)),
    }
}

#[instrument(skip(manager), err)]
pub async fn delete(
    Extension(manager): Extension<Arc<Manager>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if run_blocking(move || manager.delete(&id)).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError(Error::NotFound))
    }
}

#[instrument(skip(manager), err)]
pub async fn list(
    Extension(manager): Extension<Arc<Manager>>,
) -> Result<Json<Vec<PasteSummary>>, ApiError> {
    let summaries = run_blocking(move || manager.list()).await?;
    Ok(Json(summaries))
}

async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Error> + Send + 'static,
{
    match task::spawn_blocking(work).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!("storage task failed to join: {e}");
            Err(ApiError(Error::Storage("storage task failed".to_string())))
        }
    }
}
