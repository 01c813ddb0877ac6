use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    blogs::{
        dto::{CreateBlogRequest, ListBlogsQuery, UpdateBlogRequest},
        repo_types::Blog,
        services,
    },
    error::AppError,
    extract::{parse_id, JsonBody, QueryParams},
    jobs::dto::DeletedResponse,
    pagination::{ListLimits, Page},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route("/blogs/:id", get(get_blog).put(update_blog).delete(delete_blog))
}

#[instrument(skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListBlogsQuery>,
) -> Result<Json<Page<Blog>>, AppError> {
    let limits = ListLimits::from_config(&state.config);
    services::list_blogs(state.blogs.as_ref(), query, limits)
        .await
        .map(Json)
}

#[instrument(skip(state, payload))]
pub async fn create_blog(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBlogRequest>,
) -> Result<(StatusCode, Json<Blog>), AppError> {
    let blog = services::create_blog(state.blogs.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Blog>, AppError> {
    let id = parse_id(&id)?;
    services::get_blog(state.blogs.as_ref(), id).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateBlogRequest>,
) -> Result<Json<Blog>, AppError> {
    let id = parse_id(&id)?;
    services::update_blog(state.blogs.as_ref(), id, payload)
        .await
        .map(Json)
}

#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_id(&id)?;
    services::delete_blog(state.blogs.as_ref(), id).await?;
    Ok(Json(DeletedResponse { ok: true }))
}
