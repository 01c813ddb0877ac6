//! Request extractors whose rejections render as `AppError`.

use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::error::AppError;

/// JSON body; malformed or mistyped payloads become a 400 `{"error": ..}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string; unparsable parameters become a 400 `{"error": ..}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path ids are taken as strings so a bad id gets our own message.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation("Invalid id"))
}
