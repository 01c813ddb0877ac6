use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{HeaderValue, StatusCode},
    response::Redirect,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    error::AppError,
    extract::{parse_id, JsonBody, QueryParams},
    pagination::{ListLimits, Page},
    state::AppState,
    users::{
        dto::{
            EmailQuery, GeneratedResumeRequest, GeneratedResumeResponse, ListUsersQuery,
            ProfileUpdateRequest, ResumeUploadResponse, RoleResponse,
        },
        repo_types::User,
        resume::{self, ResumeSaveOutcome, ResumeUpload},
        services,
    },
};

/// Multipart framing allowance on top of the file cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/role", get(get_role))
        .route("/users/by-email", get(get_by_email))
        .route("/users/:id", get(get_user))
        .route("/users/:id/resume", get(download_resume))
}

pub fn write_routes(max_resume_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/users/:id", put(update_user))
        .route("/users/:id/resume-generated", put(save_generated_resume))
        .route(
            "/users/:id/resume",
            post(upload_resume)
                .layer(DefaultBodyLimit::max(max_resume_bytes + MULTIPART_OVERHEAD)),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListUsersQuery>,
) -> Result<Json<Page<User>>, AppError> {
    let limits = ListLimits::from_config(&state.config);
    services::list_users(state.users.as_ref(), query, limits)
        .await
        .map(Json)
}

#[instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<EmailQuery>,
) -> Result<Json<RoleResponse>, AppError> {
    let role = services::role_for_email(state.users.as_ref(), q.email.as_deref()).await?;
    Ok(Json(RoleResponse { role }))
}

#[instrument(skip(state))]
pub async fn get_by_email(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<EmailQuery>,
) -> Result<Json<User>, AppError> {
    services::get_user_by_email(state.users.as_ref(), q.email.as_deref())
        .await
        .map(Json)
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id)?;
    services::get_user(state.users.as_ref(), id).await.map(Json)
}

/// `?email=` is a fallback locator for clients holding a stale id.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<EmailQuery>,
    JsonBody(payload): JsonBody<ProfileUpdateRequest>,
) -> Result<Json<User>, AppError> {
    let id = match parse_id(&id) {
        Ok(id) => Some(id),
        Err(e) if q.email.is_none() => return Err(e),
        Err(_) => None,
    };
    services::update_profile(state.users.as_ref(), id, q.email.as_deref(), payload)
        .await
        .map(Json)
}

/// A body cut off by the route's size limit reports the resume cap.
fn multipart_error(e: MultipartError, max_resume_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        resume::too_large(max_resume_bytes)
    } else {
        AppError::validation(e.body_text())
    }
}

#[instrument(skip(state, mp))]
pub async fn upload_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ResumeUploadResponse>), AppError> {
    let id = parse_id(&id)?;
    let mut mp = mp?;
    let max_bytes = state.config.max_resume_bytes;

    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(|e| multipart_error(e, max_bytes))? {
        if field.name() != Some("resume") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
        upload = Some(ResumeUpload { content_type, body });
        break;
    }
    let upload = upload.ok_or_else(|| AppError::validation("No file uploaded"))?;

    let user = resume::upload_resume(
        state.users.as_ref(),
        state.storage.as_ref(),
        id,
        upload,
        max_bytes,
    )
    .await?;

    let resume_file_url = user.resume_file_url.clone().unwrap_or_default();
    Ok((
        StatusCode::CREATED,
        Json(ResumeUploadResponse {
            message: "Resume uploaded",
            resume_file_url,
            user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn download_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id)?;
    let url = resume::resume_download_url(state.users.as_ref(), state.storage.as_ref(), id).await?;
    // Redirect panics on values that cannot be a Location header.
    HeaderValue::from_str(&url)
        .map_err(|_| anyhow::anyhow!("stored resume url is not a valid Location: {url:?}"))?;
    Ok(Redirect::temporary(&url))
}

#[instrument(skip(state, payload))]
pub async fn save_generated_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<GeneratedResumeRequest>,
) -> Result<Json<GeneratedResumeResponse>, AppError> {
    let id = parse_id(&id)?;
    let outcome = resume::save_generated_resume(
        state.users.as_ref(),
        state.storage.as_ref(),
        id,
        payload.generated_resume,
        payload.replace_existing,
    )
    .await?;

    Ok(Json(match outcome {
        ResumeSaveOutcome::Saved(user) => GeneratedResumeResponse {
            message: "Resume saved",
            saved: true,
            user,
        },
        ResumeSaveOutcome::Kept(user) => {
            warn!(user_id = %id, "replace not confirmed");
            GeneratedResumeResponse {
                message: "Kept existing resume. New resume was not saved.",
                saved: false,
                user,
            }
        }
    }))
}
