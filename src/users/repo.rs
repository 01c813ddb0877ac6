use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    pagination::PageRequest,
    users::repo_types::{NewUser, ProfilePatch, Role, User, UserLookup, UserRow},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the email is already taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// `email` must already be lowercased.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self, role: Option<Role>, page: PageRequest) -> Result<(Vec<User>, i64), AppError>;
    /// Writes only the `Some` fields of `patch` and refreshes `updated_at`.
    async fn update_profile(
        &self,
        lookup: UserLookup<'_>,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, AppError>;
    async fn set_resume_file(&self, id: Uuid, url: &str) -> Result<Option<User>, AppError>;
    /// Stores a generated resume. With `clear_links`, the uploaded file and
    /// external link are cleared in the same write, and the write only
    /// happens while `resume_file_url` still equals `expected_file`.
    async fn store_generated_resume(
        &self,
        id: Uuid,
        resume: &serde_json::Value,
        clear_links: bool,
        expected_file: Option<&str>,
    ) -> Result<Option<User>, AppError>;
}

const USER_COLUMNS: &str = r#"
    id, email, password_hash, password_salt, full_name, mobile_number, role, is_active,
    address, avatar_url, headline, skills, resume_url, resume_file_url, generated_resume,
    company_name, website, founded_year, company_size, description, created_at, updated_at
"#;

const PROFILE_SET: &str = r#"
    full_name     = COALESCE($2, full_name),
    mobile_number = COALESCE($3, mobile_number),
    address       = COALESCE($4, address),
    avatar_url    = COALESCE($5, avatar_url),
    headline      = COALESCE($6, headline),
    skills        = COALESCE($7, skills),
    resume_url    = COALESCE($8, resume_url),
    company_name  = COALESCE($9, company_name),
    website       = COALESCE($10, website),
    founded_year  = COALESCE($11, founded_year),
    company_size  = COALESCE($12, company_size),
    description   = COALESCE($13, description),
    updated_at    = now()
"#;

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_user(row: UserRow) -> Result<User, AppError> {
    User::try_from(row).map_err(AppError::Internal)
}

fn into_user_opt(row: Option<UserRow>) -> Result<Option<User>, AppError> {
    row.map(into_user).transpose()
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, password_hash, password_salt, full_name, mobile_number, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.password_salt)
            .bind(&new_user.full_name)
            .bind(&new_user.mobile_number)
            .bind(new_user.role.as_str())
            .fetch_one(&self.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict("Email already registered".into())
                }
                other => AppError::Database(other),
            })?;
        into_user(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        into_user_opt(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        into_user_opt(row)
    }

    async fn list(&self, role: Option<Role>, page: PageRequest) -> Result<(Vec<User>, i64), AppError> {
        let role = role.map(|r| r.as_str());
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(role)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.db)
            .await?;
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR role = $1)")
                .bind(role)
                .fetch_one(&self.db)
                .await?;
        let users = rows.into_iter().map(into_user).collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }

    async fn update_profile(
        &self,
        lookup: UserLookup<'_>,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, AppError> {
        let filter = match lookup {
            UserLookup::Id(_) => "id = $1",
            UserLookup::Email(_) => "lower(email) = $1",
        };
        let sql = format!("UPDATE users SET {PROFILE_SET} WHERE {filter} RETURNING {USER_COLUMNS}");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match lookup {
            UserLookup::Id(id) => query.bind(id),
            UserLookup::Email(email) => query.bind(email.to_string()),
        };
        let row = query
            .bind(&patch.full_name)
            .bind(&patch.mobile_number)
            .bind(&patch.address)
            .bind(&patch.avatar_url)
            .bind(&patch.headline)
            .bind(&patch.skills)
            .bind(&patch.resume_url)
            .bind(&patch.company_name)
            .bind(&patch.website)
            .bind(patch.founded_year)
            .bind(&patch.company_size)
            .bind(&patch.description)
            .fetch_optional(&self.db)
            .await?;
        into_user_opt(row)
    }

    async fn set_resume_file(&self, id: Uuid, url: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            r#"
            UPDATE users SET resume_file_url = $2, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.db)
            .await?;
        into_user_opt(row)
    }

    async fn store_generated_resume(
        &self,
        id: Uuid,
        resume: &serde_json::Value,
        clear_links: bool,
        expected_file: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            r#"
            UPDATE users
               SET generated_resume = $2,
                   resume_file_url  = CASE WHEN $3 THEN NULL ELSE resume_file_url END,
                   resume_url       = CASE WHEN $3 THEN NULL ELSE resume_url END,
                   updated_at       = now()
             WHERE id = $1
               AND (NOT $3 OR resume_file_url IS NOT DISTINCT FROM $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(resume)
            .bind(clear_links)
            .bind(expected_file)
            .fetch_optional(&self.db)
            .await?;
        into_user_opt(row)
    }
}
