use serde::Deserialize;

use crate::blogs::repo_types::BlogAuthor;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<BlogAuthor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author: Option<BlogAuthor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBlogsQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
