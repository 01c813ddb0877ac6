use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::{JwtKeys, TokenKind},
        password::{hash_password, verify_password},
    },
    error::AppError,
    users::{
        repo::UserRepo,
        repo_types::{NewUser, Role, User},
    },
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checked registration fields, password still in plain text.
#[derive(Debug)]
pub(crate) struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub mobile_number: String,
    pub role: Role,
}

pub(crate) fn validate_registration(req: RegisterRequest) -> Result<Registration, AppError> {
    let email = normalize_email(&req.email);
    let full_name = req.full_name.trim().to_string();
    let mobile_number = req.mobile_number.trim().to_string();
    let role = req.role.trim().to_lowercase();

    if email.is_empty()
        || req.password.is_empty()
        || full_name.is_empty()
        || mobile_number.is_empty()
        || role.is_empty()
    {
        return Err(AppError::validation(
            "email, password, fullName, mobileNumber, role are required",
        ));
    }
    let role: Role = role
        .parse()
        .map_err(|_| AppError::validation("role must be one of jobseeker, company, admin"))?;
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(Registration {
        email,
        password: req.password,
        full_name,
        mobile_number,
        role,
    })
}

/// Validates, hashes and inserts exactly one user.
pub async fn register(users: &dyn UserRepo, req: RegisterRequest) -> Result<User, AppError> {
    let reg = validate_registration(req).map_err(|e| {
        warn!(error = %e, "registration rejected");
        e
    })?;

    // The unique index still backs this up for concurrent inserts.
    if users.find_by_email(&reg.email).await?.is_some() {
        warn!(email = %reg.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let digest = hash_password(&reg.password)?;
    let user = users
        .insert(NewUser {
            email: reg.email,
            password_hash: digest.hash,
            password_salt: digest.salt,
            full_name: reg.full_name,
            mobile_number: reg.mobile_number,
            role: reg.role,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok(user)
}

pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, AppError> {
    let email = normalize_email(&req.email);
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&req.password, &user.password_salt, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login for inactive user");
        return Err(AppError::Unauthorized("Account is disabled".into()));
    }

    let response = issue_tokens(keys, user)?;
    info!(user_id = %response.user.id, "user logged in");
    Ok(response)
}

pub async fn refresh(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    refresh_token: &str,
) -> Result<AuthResponse, AppError> {
    let claims = keys.verify(refresh_token, TokenKind::Refresh)?;

    let user = users
        .find_by_id(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    issue_tokens(keys, user)
}

fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        access_token: keys.issue(&user, TokenKind::Access)?,
        refresh_token: keys.issue(&user, TokenKind::Refresh)?,
        user,
    })
}
