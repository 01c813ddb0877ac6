use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Jobseeker,
    Company,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Jobseeker, Role::Company, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Jobseeker => "jobseeker",
            Role::Company => "company",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown role {s:?}"))
    }
}

/// User record. Credential fields never serialize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub full_name: String,
    pub mobile_number: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub resume_file_url: Option<String>,
    pub generated_resume: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Any of the three resume representations is present.
    pub fn has_resume(&self) -> bool {
        self.resume_file_url.is_some() || self.resume_url.is_some() || self.generated_resume.is_some()
    }
}

/// Raw `users` row; `role` is stored as text.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub full_name: String,
    pub mobile_number: String,
    pub role: String,
    pub is_active: bool,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub headline: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub resume_file_url: Option<String>,
    pub generated_resume: Option<serde_json::Value>,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub company_size: Option<String>,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: r.role.parse()?,
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            password_salt: r.password_salt,
            full_name: r.full_name,
            mobile_number: r.mobile_number,
            is_active: r.is_active,
            address: r.address,
            avatar_url: r.avatar_url,
            headline: r.headline,
            skills: r.skills,
            resume_url: r.resume_url,
            resume_file_url: r.resume_file_url,
            generated_resume: r.generated_resume,
            company_name: r.company_name,
            website: r.website,
            founded_year: r.founded_year,
            company_size: r.company_size,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated registration, ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub full_name: String,
    pub mobile_number: String,
    pub role: Role,
}

/// Columns a profile update may touch. `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub headline: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub company_name: Option<String>,
    pub website: Option<String>,
    pub founded_year: Option<i32>,
    pub company_size: Option<String>,
    pub description: Option<String>,
}

/// How a profile update addresses its target.
#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(Uuid),
    Email(&'a str),
}

impl fmt::Display for UserLookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserLookup::Id(id) => write!(f, "id={id}"),
            UserLookup::Email(email) => write!(f, "email={email}"),
        }
    }
}
