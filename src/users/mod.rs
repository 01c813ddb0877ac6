pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod resume;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router(max_resume_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes(max_resume_bytes))
}
