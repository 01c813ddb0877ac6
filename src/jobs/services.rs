use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    jobs::{
        dto::{CreateJobRequest, ListJobsQuery, UpdateJobRequest},
        repo::JobRepo,
        repo_types::{Job, JobFilter, JobPatch, NewJob},
    },
    pagination::{search_term, ListLimits, Page, PageRequest},
    text::{clean_list, non_blank, trimmed},
};

pub const DEFAULT_STATUS: &str = "Active";

fn job_not_found() -> AppError {
    AppError::not_found("Job not found")
}

pub async fn create_job(jobs: &dyn JobRepo, req: CreateJobRequest) -> Result<Job, AppError> {
    let title = req.title.trim().to_string();
    let company = req.company.trim().to_string();
    if title.is_empty() || company.is_empty() {
        warn!("job without title or company");
        return Err(AppError::validation("title and company are required"));
    }

    let job = jobs
        .insert(NewJob {
            title,
            company,
            status: trimmed(req.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            location: trimmed(req.location),
            salary: trimmed(req.salary),
            description: trimmed(req.description),
            requirements: clean_list(req.requirements),
            benefits: clean_list(req.benefits),
        })
        .await?;
    info!(job_id = %job.id, title = %job.title, "job created");
    Ok(job)
}

pub async fn get_job(jobs: &dyn JobRepo, id: Uuid) -> Result<Job, AppError> {
    jobs.find_by_id(id).await?.ok_or_else(job_not_found)
}

pub async fn list_jobs(
    jobs: &dyn JobRepo,
    query: ListJobsQuery,
    limits: ListLimits,
) -> Result<Page<Job>, AppError> {
    let filter = JobFilter {
        q: search_term(query.q.as_deref()),
        status: search_term(query.status.as_deref()),
    };
    let page = PageRequest::new(query.page, query.limit, limits);
    let (items, total) = jobs.list(&filter, page).await?;
    Ok(Page::new(page, total, items))
}

pub async fn update_job(jobs: &dyn JobRepo, id: Uuid, req: UpdateJobRequest) -> Result<Job, AppError> {
    let patch = JobPatch {
        title: non_blank("title", req.title)?,
        company: non_blank("company", req.company)?,
        status: non_blank("status", req.status)?,
        location: req.location,
        salary: req.salary,
        description: req.description,
        requirements: req.requirements.map(clean_list),
        benefits: req.benefits.map(clean_list),
    };
    let job = jobs.update(id, &patch).await?.ok_or_else(job_not_found)?;
    info!(job_id = %job.id, "job updated");
    Ok(job)
}

pub async fn delete_job(jobs: &dyn JobRepo, id: Uuid) -> Result<(), AppError> {
    if !jobs.delete(id).await? {
        return Err(job_not_found());
    }
    info!(job_id = %id, "job deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryJobRepo;

    const LIMITS: ListLimits = ListLimits {
        default_limit: 20,
        max_limit: 100,
    };

    async fn post(repo: &MemoryJobRepo, title: &str, company: &str) -> Job {
        create_job(
            repo,
            CreateJobRequest {
                title: title.into(),
                company: company.into(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    fn search(q: &str) -> ListJobsQuery {
        ListJobsQuery {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_defaults_and_validation() {
        let repo = MemoryJobRepo::default();
        let job = create_job(
            &repo,
            CreateJobRequest {
                title: " Backend Engineer ".into(),
                company: "Acme".into(),
                requirements: vec!["Rust".into(), "  ".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.status, DEFAULT_STATUS);
        assert_eq!(job.requirements, vec!["Rust".to_string()]);

        let err = create_job(
            &repo,
            CreateJobRequest {
                title: "No company".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_company() {
        let repo = MemoryJobRepo::default();
        post(&repo, "Senior Rust Developer", "Ferris Labs").await;
        post(&repo, "Accountant", "RUSTY Bank").await;
        post(&repo, "Designer", "Pixel Co").await;

        let page = list_jobs(&repo, search("rust"), LIMITS).await.unwrap();
        assert_eq!(page.total, 2);
        let titles: Vec<_> = page.items.iter().map(|j| j.title.as_str()).collect();
        assert!(titles.contains(&"Senior Rust Developer"));
        assert!(titles.contains(&"Accountant"));

        let page = list_jobs(&repo, search("PIXEL"), LIMITS).await.unwrap();
        assert_eq!(page.total, 1);

        // wildcards are literal
        let page = list_jobs(&repo, search("%"), LIMITS).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn limit_is_clamped_to_max() {
        let repo = MemoryJobRepo::default();
        for i in 0..3 {
            post(&repo, &format!("Job {i}"), "Acme").await;
        }
        let page = list_jobs(
            &repo,
            ListJobsQuery {
                limit: Some(1_000_000),
                ..Default::default()
            },
            LIMITS,
        )
        .await
        .unwrap();
        assert_eq!(page.limit, LIMITS.max_limit);
        assert_eq!(page.items.len(), 3);

        let page = list_jobs(
            &repo,
            ListJobsQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            },
            LIMITS,
        )
        .await
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let repo = MemoryJobRepo::default();
        let job = post(&repo, "Tester", "QA Inc").await;

        let updated = update_job(
            &repo,
            job.id,
            UpdateJobRequest {
                status: Some("Closed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, "Closed");
        assert_eq!(updated.title, "Tester");
        assert_eq!(updated.company, "QA Inc");

        let err = update_job(
            &repo,
            job.id,
            UpdateJobRequest {
                title: Some(" ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let repo = MemoryJobRepo::default();
        let job = post(&repo, "Temp", "Gone Ltd").await;

        assert!(matches!(
            delete_job(&repo, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        delete_job(&repo, job.id).await.unwrap();
        assert!(matches!(
            delete_job(&repo, job.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(get_job(&repo, job.id).await, Err(AppError::NotFound(_))));
    }
}
