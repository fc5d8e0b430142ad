//! Client-side tables that mirror a listing and apply edits optimistically: the store is
//! written first and the local row changes only when that write succeeds, so a failed update
//! leaves the table exactly as it was without a refetch.

use super::analytics::{status_breakdown, OrganizationActivity, StatusBreakdown};
use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationWithJob, JobDraft, JobId, JobStatus,
    JobWithCounts, OrganizationId, OrganizationStatus,
};
use super::error::{BoardError, ValidationError};
use super::identity::{Actor, IdentityProvider};
use super::query::{filter_sort, JobSort, QueryCriteria, QueryPage, RecordSort};
use super::repository::BoardStore;
use super::service::JobBoardService;
use super::storage::ResumeStorage;

/// Application review table of the organization portal and the admin back office.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationReviewTable {
    rows: Vec<ApplicationWithJob>,
}

impl ApplicationReviewTable {
    pub fn new(rows: Vec<ApplicationWithJob>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ApplicationWithJob] {
        &self.rows
    }

    pub fn view(
        &self,
        criteria: &QueryCriteria<RecordSort>,
    ) -> Result<QueryPage<ApplicationWithJob>, ValidationError> {
        filter_sort(&self.rows, criteria)
    }

    pub fn breakdown(&self) -> StatusBreakdown {
        let applications: Vec<_> = self
            .rows
            .iter()
            .map(|row| row.application.clone())
            .collect();
        status_breakdown(&applications)
    }

    pub fn set_status<S, I, F>(
        &mut self,
        service: &JobBoardService<S, I, F>,
        actor: &Actor,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<&ApplicationWithJob, BoardError>
    where
        S: BoardStore + 'static,
        I: IdentityProvider + 'static,
        F: ResumeStorage + 'static,
    {
        let index = self
            .rows
            .iter()
            .position(|row| &row.application.id == application_id)
            .ok_or_else(|| BoardError::not_found("application", application_id))?;

        let stored = service.update_application_status(actor, application_id, status)?;
        let row = &mut self.rows[index];
        row.application = stored;
        Ok(row)
    }
}

/// Jobs management table with per-job application counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPostingTable {
    rows: Vec<JobWithCounts>,
}

impl JobPostingTable {
    pub fn new(rows: Vec<JobWithCounts>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[JobWithCounts] {
        &self.rows
    }

    pub fn find(&self, job_id: &JobId) -> Option<&JobWithCounts> {
        self.rows.iter().find(|row| &row.job.id == job_id)
    }

    pub fn view(
        &self,
        criteria: &QueryCriteria<JobSort>,
    ) -> Result<Vec<JobWithCounts>, ValidationError> {
        let jobs: Vec<_> = self.rows.iter().map(|row| row.job.clone()).collect();
        let page = filter_sort(&jobs, criteria)?;
        Ok(page
            .items
            .into_iter()
            .filter_map(|job| self.find(&job.id).cloned())
            .collect())
    }

    pub fn toggle<S, I, F>(
        &mut self,
        service: &JobBoardService<S, I, F>,
        actor: &Actor,
        job_id: &JobId,
    ) -> Result<JobStatus, BoardError>
    where
        S: BoardStore + 'static,
        I: IdentityProvider + 'static,
        F: ResumeStorage + 'static,
    {
        let index = self.position(job_id)?;
        let stored = service.toggle_job(actor, job_id)?;
        let status = stored.status;
        self.rows[index].job = stored;
        Ok(status)
    }

    pub fn edit<S, I, F>(
        &mut self,
        service: &JobBoardService<S, I, F>,
        actor: &Actor,
        job_id: &JobId,
        draft: JobDraft,
    ) -> Result<(), BoardError>
    where
        S: BoardStore + 'static,
        I: IdentityProvider + 'static,
        F: ResumeStorage + 'static,
    {
        let index = self.position(job_id)?;
        let stored = service.update_job(actor, job_id, draft)?;
        self.rows[index].job = stored;
        Ok(())
    }

    pub fn delete<S, I, F>(
        &mut self,
        service: &JobBoardService<S, I, F>,
        actor: &Actor,
        job_id: &JobId,
    ) -> Result<(), BoardError>
    where
        S: BoardStore + 'static,
        I: IdentityProvider + 'static,
        F: ResumeStorage + 'static,
    {
        let index = self.position(job_id)?;
        service.delete_job(actor, job_id)?;
        self.rows.remove(index);
        Ok(())
    }

    fn position(&self, job_id: &JobId) -> Result<usize, BoardError> {
        self.rows
            .iter()
            .position(|row| &row.job.id == job_id)
            .ok_or_else(|| BoardError::not_found("job", job_id))
    }
}

/// Admin organizations table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationDirectory {
    rows: Vec<OrganizationActivity>,
}

impl OrganizationDirectory {
    pub fn new(rows: Vec<OrganizationActivity>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[OrganizationActivity] {
        &self.rows
    }

    pub fn set_status<S, I, F>(
        &mut self,
        service: &JobBoardService<S, I, F>,
        actor: &Actor,
        organization_id: &OrganizationId,
        status: OrganizationStatus,
    ) -> Result<&OrganizationActivity, BoardError>
    where
        S: BoardStore + 'static,
        I: IdentityProvider + 'static,
        F: ResumeStorage + 'static,
    {
        let index = self
            .rows
            .iter()
            .position(|row| &row.organization.id == organization_id)
            .ok_or_else(|| BoardError::not_found("organization", organization_id))?;

        let stored = service.set_organization_status(actor, organization_id, status)?;
        let row = &mut self.rows[index];
        row.organization = stored;
        Ok(row)
    }
}
