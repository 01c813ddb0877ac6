use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl BlogAuthor {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<BlogAuthor>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Flat row; the author is stored as two nullable columns.
#[derive(Debug, FromRow)]
pub(crate) struct BlogRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        let author = BlogAuthor {
            name: row.author_name,
            email: row.author_email,
        };
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            cover_image_url: row.cover_image_url,
            tags: row.tags,
            author: (!author.is_empty()).then_some(author),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    pub author: BlogAuthor,
}

/// `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    /// Case-insensitive substring over title, content and tags.
    pub q: Option<String>,
    /// Case-insensitive exact tag.
    pub tag: Option<String>,
}
