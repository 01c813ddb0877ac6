use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::services::normalize_email,
    error::AppError,
    pagination::{ListLimits, Page, PageRequest},
    text::{clean_list, non_blank},
    users::{
        dto::{ListUsersQuery, ProfileUpdateRequest},
        repo::UserRepo,
        repo_types::{ProfilePatch, Role, User, UserLookup},
    },
};

fn user_not_found() -> AppError {
    AppError::not_found("User not found")
}

pub async fn get_user(users: &dyn UserRepo, id: Uuid) -> Result<User, AppError> {
    users.find_by_id(id).await?.ok_or_else(user_not_found)
}

/// Normalized email from a query parameter; blank is a validation error.
pub(crate) fn required_email(raw: Option<&str>) -> Result<String, AppError> {
    let email = raw.map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        return Err(AppError::validation("email is required"));
    }
    Ok(email)
}

pub async fn get_user_by_email(users: &dyn UserRepo, raw: Option<&str>) -> Result<User, AppError> {
    let email = required_email(raw)?;
    users.find_by_email(&email).await?.ok_or_else(user_not_found)
}

pub async fn role_for_email(users: &dyn UserRepo, raw: Option<&str>) -> Result<Role, AppError> {
    get_user_by_email(users, raw).await.map(|u| u.role)
}

pub async fn list_users(
    users: &dyn UserRepo,
    query: ListUsersQuery,
    limits: ListLimits,
) -> Result<Page<User>, AppError> {
    let role = match query.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Some(
            raw.parse::<Role>()
                .map_err(|_| AppError::validation("Invalid role filter"))?,
        ),
        None => None,
    };
    let page = PageRequest::new(query.page, query.limit, limits);
    let (items, total) = users.list(role, page).await?;
    Ok(Page::new(page, total, items))
}

/// Keeps only the fields the target's role may edit.
pub(crate) fn build_patch(req: ProfileUpdateRequest, role: Role) -> Result<ProfilePatch, AppError> {
    let mut patch = ProfilePatch {
        full_name: non_blank("fullName", req.full_name)?,
        mobile_number: non_blank("mobileNumber", req.mobile_number)?,
        address: req.address,
        avatar_url: req.avatar_url,
        ..ProfilePatch::default()
    };

    match role {
        Role::Jobseeker => {
            patch.headline = req.headline;
            patch.skills = req.skills.map(clean_list);
            patch.resume_url = req.resume_url;
        }
        Role::Company => {
            patch.company_name = req.company_name;
            patch.website = req.website;
            patch.founded_year = req.founded_year;
            patch.company_size = req.company_size;
            patch.description = req.description;
        }
        Role::Admin => {}
    }
    Ok(patch)
}

/// Partial profile update. The id is tried first; the email is only used
/// when there is no id or the id matches no user.
pub async fn update_profile(
    users: &dyn UserRepo,
    id: Option<Uuid>,
    email: Option<&str>,
    req: ProfileUpdateRequest,
) -> Result<User, AppError> {
    let email = email.map(normalize_email).filter(|e| !e.is_empty());

    let mut target = None;
    if let Some(id) = id {
        match users.find_by_id(id).await? {
            Some(user) => target = Some((UserLookup::Id(id), user)),
            None => debug!(%id, "profile update id miss"),
        }
    }
    if target.is_none() {
        if let Some(email) = email.as_deref() {
            if let Some(user) = users.find_by_email(email).await? {
                if id.is_some() {
                    warn!(email, "profile update fell back to email lookup");
                }
                target = Some((UserLookup::Email(email), user));
            }
        }
    }
    let (lookup, current) = target.ok_or_else(user_not_found)?;

    let patch = build_patch(req, current.role)?;
    let updated = users
        .update_profile(lookup, &patch)
        .await?
        .ok_or_else(user_not_found)?;

    info!(user_id = %updated.id, via = %lookup, "profile updated");
    Ok(updated)
}
