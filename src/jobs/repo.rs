use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    jobs::repo_types::{Job, JobFilter, JobPatch, NewJob},
    pagination::{contains_pattern, PageRequest},
};

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn insert(&self, job: NewJob) -> Result<Job, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    /// Newest first.
    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, i64), AppError>;
    async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, AppError>;
    /// `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

const JOB_COLUMNS: &str = r#"
    id, title, company, status, location, salary, description,
    requirements, benefits, created_at, updated_at
"#;

const JOB_FILTER: &str = r#"
    ($1::text IS NULL OR title ILIKE $1 OR company ILIKE $1)
    AND ($2::text IS NULL OR status = $2)
"#;

#[derive(Clone)]
pub struct PgJobRepo {
    db: PgPool,
}

impl PgJobRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobRepo for PgJobRepo {
    async fn insert(&self, job: NewJob) -> Result<Job, AppError> {
        let sql = format!(
            r#"
            INSERT INTO jobs (id, title, company, status, location, salary, description, requirements, benefits)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Job>(&sql)
            .bind(Uuid::new_v4())
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.status)
            .bind(&job.location)
            .bind(&job.salary)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.benefits)
            .fetch_one(&self.db)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, i64), AppError> {
        let pattern = filter.q.as_deref().map(contains_pattern);
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE {JOB_FILTER}
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let items = sqlx::query_as::<_, Job>(&sql)
            .bind(&pattern)
            .bind(&filter.status)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.db)
            .await?;
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM jobs WHERE {JOB_FILTER}"))
            .bind(&pattern)
            .bind(&filter.status)
            .fetch_one(&self.db)
            .await?;
        Ok((items, total))
    }

    async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, AppError> {
        let sql = format!(
            r#"
            UPDATE jobs SET
                title        = COALESCE($2, title),
                company      = COALESCE($3, company),
                status       = COALESCE($4, status),
                location     = COALESCE($5, location),
                salary       = COALESCE($6, salary),
                description  = COALESCE($7, description),
                requirements = COALESCE($8, requirements),
                benefits     = COALESCE($9, benefits),
                updated_at   = now()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.company)
            .bind(&patch.status)
            .bind(&patch.location)
            .bind(&patch.salary)
            .bind(&patch.description)
            .bind(&patch.requirements)
            .bind(&patch.benefits)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
