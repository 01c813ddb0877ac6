use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::services::normalize_email,
    blogs::{
        dto::{CreateBlogRequest, ListBlogsQuery, UpdateBlogRequest},
        repo::BlogRepo,
        repo_types::{Blog, BlogAuthor, BlogFilter, BlogPatch, NewBlog},
    },
    error::AppError,
    pagination::{search_term, ListLimits, Page, PageRequest},
    text::{clean_list, non_blank, trimmed},
};

fn blog_not_found() -> AppError {
    AppError::not_found("Blog not found")
}

fn clean_author(author: Option<BlogAuthor>) -> BlogAuthor {
    let author = author.unwrap_or_default();
    BlogAuthor {
        name: trimmed(author.name),
        email: trimmed(author.email).map(|e| normalize_email(&e)),
    }
}

pub async fn create_blog(blogs: &dyn BlogRepo, req: CreateBlogRequest) -> Result<Blog, AppError> {
    let title = req.title.trim().to_string();
    let content = req.content.trim().to_string();
    if title.is_empty() || content.is_empty() {
        warn!("blog without title or content");
        return Err(AppError::validation("title and content are required"));
    }

    let blog = blogs
        .insert(NewBlog {
            title,
            content,
            cover_image_url: trimmed(req.cover_image_url),
            tags: clean_list(req.tags),
            author: clean_author(req.author),
        })
        .await?;
    info!(blog_id = %blog.id, title = %blog.title, "blog created");
    Ok(blog)
}

pub async fn get_blog(blogs: &dyn BlogRepo, id: Uuid) -> Result<Blog, AppError> {
    blogs.find_by_id(id).await?.ok_or_else(blog_not_found)
}

pub async fn list_blogs(
    blogs: &dyn BlogRepo,
    query: ListBlogsQuery,
    limits: ListLimits,
) -> Result<Page<Blog>, AppError> {
    let filter = BlogFilter {
        q: search_term(query.q.as_deref()),
        tag: search_term(query.tag.as_deref()),
    };
    let page = PageRequest::new(query.page, query.limit, limits);
    let (items, total) = blogs.list(&filter, page).await?;
    Ok(Page::new(page, total, items))
}

pub async fn update_blog(
    blogs: &dyn BlogRepo,
    id: Uuid,
    req: UpdateBlogRequest,
) -> Result<Blog, AppError> {
    let author = req.author.map(|a| clean_author(Some(a))).unwrap_or_default();
    let patch = BlogPatch {
        title: non_blank("title", req.title)?,
        content: non_blank("content", req.content)?,
        cover_image_url: req.cover_image_url,
        tags: req.tags.map(clean_list),
        author_name: author.name,
        author_email: author.email,
    };
    let blog = blogs.update(id, &patch).await?.ok_or_else(blog_not_found)?;
    info!(blog_id = %blog.id, "blog updated");
    Ok(blog)
}

pub async fn delete_blog(blogs: &dyn BlogRepo, id: Uuid) -> Result<(), AppError> {
    if !blogs.delete(id).await? {
        return Err(blog_not_found());
    }
    info!(blog_id = %id, "blog deleted");
    Ok(())
}
