//! In-memory repositories and storage for unit and router tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    blogs::{
        repo::BlogRepo,
        repo_types::{Blog, BlogAuthor, BlogFilter, BlogPatch, NewBlog},
    },
    error::AppError,
    jobs::{
        repo::JobRepo,
        repo_types::{Job, JobFilter, JobPatch, NewJob},
    },
    pagination::PageRequest,
    storage::{sanitize_key, StorageClient},
    users::{
        repo::UserRepo,
        repo_types::{NewUser, ProfilePatch, Role, User, UserLookup},
    },
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Newest first, then sliced to the requested window.
fn window<T: Clone>(
    mut rows: Vec<T>,
    created: impl Fn(&T) -> (OffsetDateTime, Uuid),
    page: PageRequest,
) -> (Vec<T>, i64) {
    rows.sort_by_key(|r| std::cmp::Reverse(created(r)));
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (items, total)
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *slot = value.clone();
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut rows = lock(&self.rows);
        if rows
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            password_salt: new_user.password_salt,
            full_name: new_user.full_name,
            mobile_number: new_user.mobile_number,
            role: new_user.role,
            is_active: true,
            address: None,
            avatar_url: None,
            headline: None,
            skills: None,
            resume_url: None,
            resume_file_url: None,
            generated_resume: None,
            company_name: None,
            website: None,
            founded_year: None,
            company_size: None,
            description: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(lock(&self.rows).iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn list(&self, role: Option<Role>, page: PageRequest) -> Result<(Vec<User>, i64), AppError> {
        let rows: Vec<User> = lock(&self.rows)
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        Ok(window(rows, |u| (u.created_at, u.id), page))
    }

    async fn update_profile(
        &self,
        lookup: UserLookup<'_>,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, AppError> {
        let mut rows = lock(&self.rows);
        let Some(user) = rows.iter_mut().find(|u| match lookup {
            UserLookup::Id(id) => u.id == id,
            UserLookup::Email(email) => u.email.to_lowercase() == email,
        }) else {
            return Ok(None);
        };
        set(&mut user.full_name, &patch.full_name);
        set(&mut user.mobile_number, &patch.mobile_number);
        set_opt(&mut user.address, &patch.address);
        set_opt(&mut user.avatar_url, &patch.avatar_url);
        set_opt(&mut user.headline, &patch.headline);
        set_opt(&mut user.skills, &patch.skills);
        set_opt(&mut user.resume_url, &patch.resume_url);
        set_opt(&mut user.company_name, &patch.company_name);
        set_opt(&mut user.website, &patch.website);
        set_opt(&mut user.founded_year, &patch.founded_year);
        set_opt(&mut user.company_size, &patch.company_size);
        set_opt(&mut user.description, &patch.description);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn set_resume_file(&self, id: Uuid, url: &str) -> Result<Option<User>, AppError> {
        let mut rows = lock(&self.rows);
        Ok(rows.iter_mut().find(|u| u.id == id).map(|user| {
            user.resume_file_url = Some(url.to_string());
            user.updated_at = OffsetDateTime::now_utc();
            user.clone()
        }))
    }

    async fn store_generated_resume(
        &self,
        id: Uuid,
        resume: &serde_json::Value,
        clear_links: bool,
        expected_file: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let mut rows = lock(&self.rows);
        let Some(user) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if clear_links {
            if user.resume_file_url.as_deref() != expected_file {
                return Ok(None);
            }
            user.resume_file_url = None;
            user.resume_url = None;
        }
        user.generated_resume = Some(resume.clone());
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }
}

/// Registers a user with password `secret1`.
pub async fn seed_user(repo: &dyn UserRepo, email: &str, role: Role) -> User {
    let digest = hash_password("secret1").unwrap();
    repo.insert(NewUser {
        email: email.to_lowercase(),
        password_hash: digest.hash,
        password_salt: digest.salt,
        full_name: "Test User".into(),
        mobile_number: "+8801000000000".into(),
        role,
    })
    .await
    .unwrap()
}

#[derive(Default)]
pub struct MemoryJobRepo {
    rows: Mutex<Vec<Job>>,
}

#[async_trait]
impl JobRepo for MemoryJobRepo {
    async fn insert(&self, job: NewJob) -> Result<Job, AppError> {
        let now = OffsetDateTime::now_utc();
        let job = Job {
            id: Uuid::new_v4(),
            title: job.title,
            company: job.company,
            status: job.status,
            location: job.location,
            salary: job.salary,
            description: job.description,
            requirements: job.requirements,
            benefits: job.benefits,
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows).push(job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(lock(&self.rows).iter().find(|j| j.id == id).cloned())
    }

    async fn list(&self, filter: &JobFilter, page: PageRequest) -> Result<(Vec<Job>, i64), AppError> {
        let rows: Vec<Job> = lock(&self.rows)
            .iter()
            .filter(|j| {
                filter
                    .q
                    .as_deref()
                    .map_or(true, |q| contains_ci(&j.title, q) || contains_ci(&j.company, q))
            })
            .filter(|j| filter.status.as_deref().map_or(true, |s| j.status == s))
            .cloned()
            .collect();
        Ok(window(rows, |j| (j.created_at, j.id), page))
    }

    async fn update(&self, id: Uuid, patch: &JobPatch) -> Result<Option<Job>, AppError> {
        let mut rows = lock(&self.rows);
        let Some(job) = rows.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        set(&mut job.title, &patch.title);
        set(&mut job.company, &patch.company);
        set(&mut job.status, &patch.status);
        set_opt(&mut job.location, &patch.location);
        set_opt(&mut job.salary, &patch.salary);
        set_opt(&mut job.description, &patch.description);
        set(&mut job.requirements, &patch.requirements);
        set(&mut job.benefits, &patch.benefits);
        job.updated_at = OffsetDateTime::now_utc();
        Ok(Some(job.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|j| j.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryBlogRepo {
    rows: Mutex<Vec<Blog>>,
}

#[async_trait]
impl BlogRepo for MemoryBlogRepo {
    async fn insert(&self, blog: NewBlog) -> Result<Blog, AppError> {
        let now = OffsetDateTime::now_utc();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            content: blog.content,
            cover_image_url: blog.cover_image_url,
            tags: blog.tags,
            author: (!blog.author.is_empty()).then_some(blog.author),
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows).push(blog.clone());
        Ok(blog)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, AppError> {
        Ok(lock(&self.rows).iter().find(|b| b.id == id).cloned())
    }

    async fn list(&self, filter: &BlogFilter, page: PageRequest) -> Result<(Vec<Blog>, i64), AppError> {
        let rows: Vec<Blog> = lock(&self.rows)
            .iter()
            .filter(|b| {
                filter.q.as_deref().map_or(true, |q| {
                    contains_ci(&b.title, q)
                        || contains_ci(&b.content, q)
                        || b.tags.iter().any(|t| contains_ci(t, q))
                })
            })
            .filter(|b| {
                filter
                    .tag
                    .as_deref()
                    .map_or(true, |tag| b.tags.iter().any(|t| t.to_lowercase() == tag.to_lowercase()))
            })
            .cloned()
            .collect();
        Ok(window(rows, |b| (b.created_at, b.id), page))
    }

    async fn update(&self, id: Uuid, patch: &BlogPatch) -> Result<Option<Blog>, AppError> {
        let mut rows = lock(&self.rows);
        let Some(blog) = rows.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        set(&mut blog.title, &patch.title);
        set(&mut blog.content, &patch.content);
        set_opt(&mut blog.cover_image_url, &patch.cover_image_url);
        set(&mut blog.tags, &patch.tags);
        let mut author = blog.author.take().unwrap_or_default();
        set_opt(&mut author.name, &patch.author_name);
        set_opt(&mut author.email, &patch.author_email);
        blog.author = (author != BlogAuthor::default()).then_some(author);
        blog.updated_at = OffsetDateTime::now_utc();
        Ok(Some(blog.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|b| b.id != id);
        Ok(rows.len() < before)
    }
}

const MEMORY_FILES: &str = "memory://files/";
const MEMORY_PRESIGNED: &str = "memory://presigned/";

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.objects).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let key = sanitize_key(key).ok_or_else(|| anyhow::anyhow!("invalid key {key:?}"))?;
        lock(&self.objects).insert(key, body);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        lock(&self.objects).remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        Ok(format!("{MEMORY_PRESIGNED}{key}"))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{MEMORY_FILES}{key}")
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(MEMORY_FILES).and_then(sanitize_key)
    }
}
