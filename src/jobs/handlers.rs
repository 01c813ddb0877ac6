use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    extract::{parse_id, JsonBody, QueryParams},
    jobs::{
        dto::{CreateJobRequest, DeletedResponse, ListJobsQuery, UpdateJobRequest},
        repo_types::Job,
        services,
    },
    pagination::{ListLimits, Page},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:id", get(get_job).put(update_job).delete(delete_job))
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListJobsQuery>,
) -> Result<Json<Page<Job>>, AppError> {
    let limits = ListLimits::from_config(&state.config);
    services::list_jobs(state.jobs.as_ref(), query, limits)
        .await
        .map(Json)
}

#[instrument(skip(state, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = services::create_job(state.jobs.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    let id = parse_id(&id)?;
    services::get_job(state.jobs.as_ref(), id).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateJobRequest>,
) -> Result<Json<Job>, AppError> {
    let id = parse_id(&id)?;
    services::update_job(state.jobs.as_ref(), id, payload)
        .await
        .map(Json)
}

#[instrument(skip(state))]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_id(&id)?;
    services::delete_job(state.jobs.as_ref(), id).await?;
    Ok(Json(DeletedResponse { ok: true }))
}
