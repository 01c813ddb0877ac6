//! Resume artifacts: uploaded PDFs and generated (structured) resumes.
//!
//! A user is expected to have one current resume. Uploads never remove an
//! earlier file; replacing with a generated resume is the only path that
//! deletes one, and only when the caller asked for it.

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    storage::StorageClient,
    users::{repo::UserRepo, repo_types::User},
};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const PRESIGN_TTL_SECS: u64 = 10 * 60;

/// One `resume` multipart part.
#[derive(Debug)]
pub struct ResumeUpload {
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug)]
pub enum ResumeSaveOutcome {
    Saved(User),
    /// An existing resume was present and the caller did not confirm replacing it.
    Kept(User),
}

/// Per-user, timestamped key so repeated uploads never collide.
pub(crate) fn resume_key(user_id: Uuid, at: OffsetDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!("resumes/{user_id}-{millis}.pdf")
}

pub(crate) fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!("Resume exceeds the {max_bytes} byte limit"))
}

fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

pub async fn upload_resume(
    users: &dyn UserRepo,
    storage: &dyn StorageClient,
    user_id: Uuid,
    upload: ResumeUpload,
    max_bytes: usize,
) -> Result<User, AppError> {
    if !is_pdf(upload.content_type.as_deref()) {
        warn!(%user_id, content_type = ?upload.content_type, "rejected non-pdf resume");
        return Err(AppError::validation("Only PDF files are allowed"));
    }
    if upload.body.is_empty() {
        return Err(AppError::validation("No file uploaded"));
    }
    if upload.body.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    // Look the user up first so an unknown id never leaves a file behind.
    if users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let key = resume_key(user_id, OffsetDateTime::now_utc());
    let size = upload.body.len();
    storage.put_object(&key, upload.body, PDF_CONTENT_TYPE).await?;
    let url = storage.public_url(&key);

    match users.set_resume_file(user_id, &url).await {
        Ok(Some(user)) => {
            info!(%user_id, %key, size, "resume uploaded");
            Ok(user)
        }
        outcome => {
            if let Err(e) = storage.delete_object(&key).await {
                warn!(error = %e, %key, "failed to remove staged resume");
            }
            match outcome {
                Err(e) => Err(e),
                _ => Err(AppError::not_found("User not found")),
            }
        }
    }
}

/// Where `GET /users/:id/resume` should send the client.
pub async fn resume_download_url(
    users: &dyn UserRepo,
    storage: &dyn StorageClient,
    user_id: Uuid,
) -> Result<String, AppError> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let url = user
        .resume_file_url
        .ok_or_else(|| AppError::not_found("No resume uploaded"))?;

    match storage.key_for_url(&url) {
        Some(key) => Ok(storage.presign_get(&key, PRESIGN_TTL_SECS).await?),
        None => Ok(url),
    }
}

/// Stores a generated resume, gated on `replace_existing` when the user
/// already has one.
///
/// On replace the record is committed first (new JSON in, file and link
/// references out, guarded on the file reference read here) and the old
/// file is deleted afterwards. A failure between the two leaves an
/// unreferenced file, never a reference to a missing one.
pub async fn save_generated_resume(
    users: &dyn UserRepo,
    storage: &dyn StorageClient,
    user_id: Uuid,
    resume: Option<serde_json::Value>,
    replace_existing: bool,
) -> Result<ResumeSaveOutcome, AppError> {
    let resume = match resume {
        Some(v) if v.is_object() => v,
        _ => return Err(AppError::validation("No resume provided")),
    };

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !user.has_resume() {
        let saved = users
            .store_generated_resume(user_id, &resume, false, None)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        info!(%user_id, "generated resume saved");
        return Ok(ResumeSaveOutcome::Saved(saved));
    }

    if !replace_existing {
        info!(%user_id, "existing resume kept, generated resume not saved");
        return Ok(ResumeSaveOutcome::Kept(user));
    }

    let old_file = user.resume_file_url.clone();
    let Some(saved) = users
        .store_generated_resume(user_id, &resume, true, old_file.as_deref())
        .await?
    else {
        return Err(match users.find_by_id(user_id).await? {
            Some(_) => AppError::Conflict("Resume changed while saving; retry".into()),
            None => AppError::not_found("User not found"),
        });
    };

    if let Some(key) = old_file.as_deref().and_then(|url| storage.key_for_url(url)) {
        match storage.delete_object(&key).await {
            Ok(()) => info!(%user_id, %key, "deleted replaced resume file"),
            Err(e) => warn!(error = %e, %user_id, %key, "replaced resume file left orphaned"),
        }
    }

    info!(%user_id, "generated resume replaced existing resume");
    Ok(ResumeSaveOutcome::Saved(saved))
}
