use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AdminUser, Application, ApplicationId, ApplicationStatus, Job, JobId, JobStatus,
    Organization, OrganizationId, OrganizationStatus, SiteSetting, UserId,
};

/// Storage abstraction over the relational backend so the service can be exercised in
/// isolation.
///
/// Every method is a single row-level round trip. Scoping (organization ownership, applicant
/// identity) is expressed through the filter structs so implementations can push it into their
/// `WHERE` clauses.
pub trait BoardStore: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update_job(&self, job: Job) -> Result<Job, RepositoryError>;
    /// Writes only `status` and `updated_at`, leaving concurrent edits to other columns intact.
    fn patch_job_status(
        &self,
        id: &JobId,
        patch: StatusPatch<JobStatus>,
    ) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Removes the job and every application submitted against it.
    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError>;
    fn select_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError>;
    fn count_jobs(&self, filter: &JobFilter) -> Result<usize, RepositoryError>;

    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn patch_application_status(
        &self,
        id: &ApplicationId,
        patch: StatusPatch<ApplicationStatus>,
    ) -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn select_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn count_applications(&self, filter: &ApplicationFilter) -> Result<usize, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the email is already registered.
    fn insert_organization(
        &self,
        organization: Organization,
    ) -> Result<Organization, RepositoryError>;
    fn patch_organization_status(
        &self,
        id: &OrganizationId,
        patch: StatusPatch<OrganizationStatus>,
    ) -> Result<Organization, RepositoryError>;
    fn fetch_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError>;
    fn fetch_organization_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Organization>, RepositoryError>;
    fn select_organizations(
        &self,
        filter: &OrganizationFilter,
    ) -> Result<Vec<Organization>, RepositoryError>;
    fn count_organizations(&self, filter: &OrganizationFilter) -> Result<usize, RepositoryError>;

    fn fetch_admin(&self, id: &UserId) -> Result<Option<AdminUser>, RepositoryError>;

    fn select_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError>;
    /// Replaces the value of an existing key; unknown keys are [`RepositoryError::NotFound`].
    fn update_setting(&self, key: &str, value: String) -> Result<SiteSetting, RepositoryError>;
}

/// Single-column status update, `UPDATE ... SET status = $1, updated_at = $2 WHERE id = $3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPatch<S> {
    pub status: S,
    pub updated_at: DateTime<Utc>,
}

impl<S> StatusPatch<S> {
    pub fn new(status: S, updated_at: DateTime<Utc>) -> Self {
        Self { status, updated_at }
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Row ordering on the entity's primary timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recency {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Null-check on a job's owning organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Ownership {
    #[default]
    Any,
    /// `organization_id IS NULL`: admin-seeded postings.
    Unowned,
    OwnedBy(OrganizationId),
}

impl Ownership {
    fn matches(&self, owner: Option<&OrganizationId>) -> bool {
        match self {
            Self::Any => true,
            Self::Unowned => owner.is_none(),
            Self::OwnedBy(id) => owner == Some(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub ownership: Ownership,
    /// Membership (`id IN (...)`).
    pub ids: Option<Vec<JobId>>,
    pub recency: Recency,
    pub limit: Option<usize>,
}

impl JobFilter {
    /// Jobs visible on the public board.
    pub fn public() -> Self {
        Self {
            status: Some(JobStatus::Active),
            ..Self::default()
        }
    }

    pub fn owned_by(organization_id: OrganizationId) -> Self {
        Self {
            ownership: Ownership::OwnedBy(organization_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.status.map_or(true, |status| job.status == status)
            && self.ownership.matches(job.organization_id.as_ref())
            && self
                .ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&job.id))
    }

    /// Applies ordering and `limit` to rows that already passed [`JobFilter::matches`].
    pub fn window(&self, mut jobs: Vec<Job>) -> Vec<Job> {
        match self.recency {
            Recency::NewestFirst => jobs.sort_by(|a, b| b.posted_date.cmp(&a.posted_date)),
            Recency::OldestFirst => jobs.sort_by(|a, b| a.posted_date.cmp(&b.posted_date)),
        }
        truncate(jobs, self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub job_id: Option<JobId>,
    /// Membership (`job_id IN (...)`); an empty list matches nothing.
    pub job_ids: Option<Vec<JobId>>,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    /// `user_id IS NOT NULL`.
    pub registered_only: bool,
    pub status: Option<ApplicationStatus>,
    pub recency: Recency,
    pub limit: Option<usize>,
}

impl ApplicationFilter {
    pub fn for_job(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            ..Self::default()
        }
    }

    pub fn for_jobs(job_ids: Vec<JobId>) -> Self {
        Self {
            job_ids: Some(job_ids),
            ..Self::default()
        }
    }

    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, application: &Application) -> bool {
        self.job_id
            .as_ref()
            .map_or(true, |id| &application.job_id == id)
            && self
                .job_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&application.job_id))
            && self
                .email
                .as_deref()
                .map_or(true, |email| application.email == email)
            && self
                .user_id
                .as_ref()
                .map_or(true, |id| application.user_id.as_ref() == Some(id))
            && (!self.registered_only || application.user_id.is_some())
            && self
                .status
                .map_or(true, |status| application.status == status)
    }

    pub fn window(&self, mut applications: Vec<Application>) -> Vec<Application> {
        match self.recency {
            Recency::NewestFirst => {
                applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at))
            }
            Recency::OldestFirst => {
                applications.sort_by(|a, b| a.applied_at.cmp(&b.applied_at))
            }
        }
        truncate(applications, self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationFilter {
    pub status: Option<OrganizationStatus>,
    pub recency: Recency,
    pub limit: Option<usize>,
}

impl OrganizationFilter {
    pub fn matches(&self, organization: &Organization) -> bool {
        self.status
            .map_or(true, |status| organization.status == status)
    }

    pub fn window(&self, mut organizations: Vec<Organization>) -> Vec<Organization> {
        match self.recency {
            Recency::NewestFirst => {
                organizations.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            Recency::OldestFirst => {
                organizations.sort_by(|a, b| a.created_at.cmp(&b.created_at))
            }
        }
        truncate(organizations, self.limit)
    }
}

fn truncate<T>(mut rows: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
