use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    blogs::repo_types::{Blog, BlogFilter, BlogPatch, BlogRow, NewBlog},
    error::AppError,
    pagination::{contains_pattern, PageRequest},
};

#[async_trait]
pub trait BlogRepo: Send + Sync {
    async fn insert(&self, blog: NewBlog) -> Result<Blog, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, AppError>;
    /// Newest first.
    async fn list(&self, filter: &BlogFilter, page: PageRequest) -> Result<(Vec<Blog>, i64), AppError>;
    async fn update(&self, id: Uuid, patch: &BlogPatch) -> Result<Option<Blog>, AppError>;
    /// `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

const BLOG_COLUMNS: &str = r#"
    id, title, content, cover_image_url, tags,
    author_name, author_email, created_at, updated_at
"#;

const BLOG_FILTER: &str = r#"
    ($1::text IS NULL
        OR title ILIKE $1
        OR content ILIKE $1
        OR EXISTS (SELECT 1 FROM unnest(tags) AS t(tag) WHERE t.tag ILIKE $1))
    AND ($2::text IS NULL
        OR EXISTS (SELECT 1 FROM unnest(tags) AS t(tag) WHERE lower(t.tag) = lower($2)))
"#;

#[derive(Clone)]
pub struct PgBlogRepo {
    db: PgPool,
}

impl PgBlogRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlogRepo for PgBlogRepo {
    async fn insert(&self, blog: NewBlog) -> Result<Blog, AppError> {
        let sql = format!(
            r#"
            INSERT INTO blogs (id, title, content, cover_image_url, tags, author_name, author_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BLOG_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&blog.title)
            .bind(&blog.content)
            .bind(&blog.cover_image_url)
            .bind(&blog.tags)
            .bind(&blog.author.name)
            .bind(&blog.author.email)
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, AppError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Blog::from))
    }

    async fn list(&self, filter: &BlogFilter, page: PageRequest) -> Result<(Vec<Blog>, i64), AppError> {
        let pattern = filter.q.as_deref().map(contains_pattern);
        let sql = format!(
            r#"
            SELECT {BLOG_COLUMNS}
            FROM blogs
            WHERE {BLOG_FILTER}
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(&pattern)
            .bind(&filter.tag)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.db)
            .await?;
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM blogs WHERE {BLOG_FILTER}"))
            .bind(&pattern)
            .bind(&filter.tag)
            .fetch_one(&self.db)
            .await?;
        Ok((rows.into_iter().map(Blog::from).collect(), total))
    }

    async fn update(&self, id: Uuid, patch: &BlogPatch) -> Result<Option<Blog>, AppError> {
        let sql = format!(
            r#"
            UPDATE blogs SET
                title           = COALESCE($2, title),
                content         = COALESCE($3, content),
                cover_image_url = COALESCE($4, cover_image_url),
                tags            = COALESCE($5, tags),
                author_name     = COALESCE($6, author_name),
                author_email    = COALESCE($7, author_email),
                updated_at      = now()
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BlogRow>(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.content)
            .bind(&patch.cover_image_url)
            .bind(&patch.tags)
            .bind(&patch.author_name)
            .bind(&patch.author_email)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Blog::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
