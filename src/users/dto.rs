use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Role, User};

/// Editable profile fields. Keys not listed here are ignored, and a field
/// that is absent (or null) leaves the stored value untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    // jobseeker
    pub headline: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    // company
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub company_size: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUploadResponse {
    pub message: &'static str,
    pub resume_file_url: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResumeRequest {
    pub generated_resume: Option<serde_json::Value>,
    #[serde(default)]
    pub replace_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratedResumeResponse {
    pub message: &'static str,
    pub saved: bool,
    pub user: User,
}
