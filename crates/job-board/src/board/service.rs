use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::analytics::{
    distinct_applicants, organization_activity, AdminOverview, AnalyticsReport, DashboardStats,
    OrganizationActivity, PlatformTotals,
};
use super::domain::{
    validate_email, Applicant, Application, ApplicationId, ApplicationStatus,
    ApplicationSubmission, ApplicationWithJob, Job, JobDraft, JobId, JobStatus, JobWithCounts,
    Organization, OrganizationId, OrganizationSignup, OrganizationStatus, SiteSetting, UserId,
};
use super::error::{AuthorizationError, BoardError, ValidationError};
use super::export::{export_file_name, jobs_csv};
use super::identity::{
    ensure_portal_access, resolve_actor, Actor, AuthUser, IdentityProvider, Session,
    SignUpProfile,
};
use super::lifecycle::StatusTracked;
use super::query::{filter_sort, JobSort, QueryCriteria, QueryPage, RecordSort, DEFAULT_PAGE_SIZE};
use super::repository::{
    ApplicationFilter, BoardStore, JobFilter, OrganizationFilter, Recency, RepositoryError,
    StatusPatch,
};
use super::storage::{ResumePolicy, ResumeStorage, ResumeUpload, StoredResume};

/// Tunables the service applies on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPolicy {
    /// Page size of the public job browser when the caller does not ask for one.
    pub page_size: u32,
    pub resume: ResumePolicy,
    /// Status given to self-service organization signups.
    pub organization_signup_status: OrganizationStatus,
}

impl Default for BoardPolicy {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            resume: ResumePolicy::default(),
            organization_signup_status: OrganizationStatus::Active,
        }
    }
}

/// Portal session handed back after an organization logs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationSession {
    pub session: Session,
    pub organization: Organization,
}

/// CSV document produced for the jobs management export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsExport {
    pub file_name: String,
    pub body: String,
}

/// Facade composing the store, auth provider and resume storage.
///
/// Reads are scoped through the store filters before the query and aggregation engines run;
/// mutations authorize the [`Actor`] first and only then write.
pub struct JobBoardService<S, I, F> {
    store: Arc<S>,
    identity: Arc<I>,
    files: Arc<F>,
    policy: BoardPolicy,
    clock: fn() -> DateTime<Utc>,
}

impl<S, I, F> JobBoardService<S, I, F>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    pub fn new(store: Arc<S>, identity: Arc<I>, files: Arc<F>, policy: BoardPolicy) -> Self {
        Self {
            store,
            identity,
            files,
            policy,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &BoardPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn identity(&self) -> &Arc<I> {
        &self.identity
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Resolves the caller behind a bearer token.
    pub fn resolve(&self, token: Option<&str>) -> Result<Actor, BoardError> {
        resolve_actor(self.store.as_ref(), self.identity.as_ref(), token)
    }

    // Public board

    /// Active jobs, paginated with the configured page size unless the caller picks one.
    pub fn public_jobs(
        &self,
        criteria: QueryCriteria<JobSort>,
    ) -> Result<QueryPage<Job>, BoardError> {
        let criteria = criteria.with_default_page(self.policy.page_size)?;
        let jobs = self.store.select_jobs(&JobFilter::public())?;
        Ok(filter_sort(&jobs, &criteria)?)
    }

    pub fn public_job(&self, job_id: &JobId) -> Result<Job, BoardError> {
        self.store
            .fetch_job(job_id)?
            .filter(Job::is_public)
            .ok_or_else(|| BoardError::not_found("job", job_id))
    }

    pub fn submit_application(
        &self,
        actor: &Actor,
        job_id: &JobId,
        submission: ApplicationSubmission,
    ) -> Result<Application, BoardError> {
        let application =
            Application::from_submission(job_id.clone(), submission, actor.user_id(), self.now())?;
        self.public_job(job_id)?;

        let stored = self.store.insert_application(application)?;
        info!(
            application_id = %stored.id,
            job_id = %stored.job_id,
            role = actor.role(),
            "application submitted"
        );
        Ok(stored)
    }

    /// Validates type and size before the blob store is contacted.
    pub fn upload_resume(&self, upload: ResumeUpload) -> Result<StoredResume, BoardError> {
        self.policy.resume.validate(&upload)?;
        let file_name = upload.file_name.clone();
        let stored = self.files.upload(upload)?;
        info!(file_name = %file_name, size = stored.size, "resume uploaded");
        Ok(stored)
    }

    /// Applications submitted under an exact email address.
    pub fn track_applications(&self, email: &str) -> Result<Vec<ApplicationWithJob>, BoardError> {
        let email = email.trim();
        validate_email(email)?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::for_email(email))?;
        self.with_jobs(applications)
    }

    pub fn my_applications(&self, actor: &Actor) -> Result<Vec<ApplicationWithJob>, BoardError> {
        let user_id = actor.require_signed_in()?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::for_user(user_id))?;
        self.with_jobs(applications)
    }

    pub fn site_settings(&self) -> Result<Vec<SiteSetting>, BoardError> {
        Ok(self.store.select_settings()?)
    }

    // Accounts

    pub fn register_applicant(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthUser, BoardError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        let user = self.identity.sign_up(
            email.trim(),
            password,
            SignUpProfile {
                full_name: full_name.trim().to_string(),
            },
        )?;
        info!(user_id = %user.id, "applicant registered");
        Ok(user)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, BoardError> {
        Ok(self.identity.sign_in(email.trim(), password)?)
    }

    pub fn sign_out(&self, token: &str) -> Result<(), BoardError> {
        Ok(self.identity.sign_out(token)?)
    }

    /// Creates the auth account and the organization row; the row id mirrors the account id.
    pub fn signup_organization(
        &self,
        signup: OrganizationSignup,
    ) -> Result<Organization, BoardError> {
        signup.validate()?;
        let email = signup.email.trim();
        if self.store.fetch_organization_by_email(email)?.is_some() {
            return Err(
                RepositoryError::Conflict(format!("organization {email} already registered"))
                    .into(),
            );
        }

        let user = self.identity.sign_up(
            email,
            &signup.password,
            SignUpProfile {
                full_name: signup.contact_person.trim().to_string(),
            },
        )?;

        let now = self.now();
        let organization = Organization {
            id: OrganizationId::from(&user.id),
            company_name: signup.company_name.trim().to_string(),
            contact_person: signup.contact_person.trim().to_string(),
            email: user.email.clone(),
            status: self.policy.organization_signup_status,
            created_at: now,
            updated_at: now,
        };

        let stored = match self.store.insert_organization(organization) {
            Ok(stored) => stored,
            Err(err) => {
                if let Err(rollback) = self.identity.delete_user(&user.id) {
                    warn!(
                        %email,
                        error = %rollback,
                        "orphaned organization account left behind"
                    );
                }
                return Err(err.into());
            }
        };
        info!(
            organization_id = %stored.id,
            status = stored.status.as_str(),
            "organization signed up"
        );
        Ok(stored)
    }

    /// Portal login. Accounts without an organization row, or whose organization is not
    /// active, are signed out again and refused.
    pub fn organization_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<OrganizationSession, BoardError> {
        let session = self.identity.sign_in(email.trim(), password)?;
        let organization = self
            .store
            .fetch_organization(&OrganizationId::from(&session.user.id))?;

        let refusal = match &organization {
            None => Some(AuthorizationError::Forbidden("not an organization account")),
            Some(organization) => ensure_portal_access(organization).err(),
        };

        match (organization, refusal) {
            (Some(organization), None) => {
                info!(organization_id = %organization.id, "organization logged in");
                Ok(OrganizationSession {
                    session,
                    organization,
                })
            }
            (_, refusal) => {
                if let Err(err) = self.identity.sign_out(&session.access_token) {
                    warn!(
                        email = %session.user.email,
                        error = %err,
                        "refused session not revoked"
                    );
                }
                let error = refusal.unwrap_or(AuthorizationError::Unauthenticated);
                warn!(email = %session.user.email, %error, "portal login refused");
                Err(error.into())
            }
        }
    }

    // Job management

    pub fn create_job(&self, actor: &Actor, draft: JobDraft) -> Result<Job, BoardError> {
        let owner = match actor {
            Actor::Admin(_) => None,
            Actor::Organization(organization) => Some(organization.id.clone()),
            Actor::Anonymous => return Err(AuthorizationError::Unauthenticated.into()),
            Actor::Applicant(_) => {
                return Err(AuthorizationError::Forbidden("applicants cannot post jobs").into())
            }
        };

        let job = Job::from_draft(draft, owner, self.now())?;
        let stored = self.store.insert_job(job)?;
        info!(job_id = %stored.id, role = actor.role(), "job created");
        Ok(stored)
    }

    pub fn update_job(
        &self,
        actor: &Actor,
        job_id: &JobId,
        draft: JobDraft,
    ) -> Result<Job, BoardError> {
        draft.validate()?;
        let mut job = self.load_job(job_id)?;
        actor.authorize_job(&job)?;
        job.apply_draft(draft, self.now())?;
        Ok(self.store.update_job(job)?)
    }

    pub fn toggle_job(&self, actor: &Actor, job_id: &JobId) -> Result<Job, BoardError> {
        let job = self.load_job(job_id)?;
        actor.authorize_job(&job)?;
        let target = job.status.toggled();
        self.store_job_status(actor, job, target)
    }

    pub fn set_job_status(
        &self,
        actor: &Actor,
        job_id: &JobId,
        status: JobStatus,
    ) -> Result<Job, BoardError> {
        let job = self.load_job(job_id)?;
        actor.authorize_job(&job)?;
        self.store_job_status(actor, job, status)
    }

    fn store_job_status(
        &self,
        actor: &Actor,
        mut job: Job,
        status: JobStatus,
    ) -> Result<Job, BoardError> {
        let now = self.now();
        let change = job.transition(status, now);
        if change.is_noop() {
            return Ok(job);
        }
        let stored = self
            .store
            .patch_job_status(&job.id, StatusPatch::new(change.to, now))?;
        info!(
            job_id = %stored.id,
            from = change.from.as_str(),
            to = change.to.as_str(),
            role = actor.role(),
            "job status changed"
        );
        Ok(stored)
    }

    /// Deletes the job; its applications go with it.
    pub fn delete_job(&self, actor: &Actor, job_id: &JobId) -> Result<(), BoardError> {
        let job = self.load_job(job_id)?;
        actor.authorize_job(&job)?;
        self.store.delete_job(job_id)?;
        info!(job_id = %job_id, role = actor.role(), "job deleted");
        Ok(())
    }

    // Organization portal

    pub fn organization_jobs(
        &self,
        actor: &Actor,
        criteria: QueryCriteria<JobSort>,
    ) -> Result<QueryPage<JobWithCounts>, BoardError> {
        let organization = actor.require_organization()?;
        let jobs = self
            .store
            .select_jobs(&JobFilter::owned_by(organization.id.clone()))?;
        self.with_counts(&jobs, &criteria)
    }

    pub fn organization_applications(
        &self,
        actor: &Actor,
        criteria: QueryCriteria<RecordSort>,
    ) -> Result<QueryPage<ApplicationWithJob>, BoardError> {
        let (jobs, applications) = self.organization_rows(actor)?;
        Ok(filter_sort(&join(applications, &jobs), &criteria)?)
    }

    pub fn organization_stats(&self, actor: &Actor) -> Result<DashboardStats, BoardError> {
        let (jobs, applications) = self.organization_rows(actor)?;
        Ok(DashboardStats::from_collections(&jobs, &applications))
    }

    fn organization_rows(
        &self,
        actor: &Actor,
    ) -> Result<(Vec<Job>, Vec<Application>), BoardError> {
        let organization = actor.require_organization()?;
        let jobs = self
            .store
            .select_jobs(&JobFilter::owned_by(organization.id.clone()))?;
        let job_ids = jobs.iter().map(|job| job.id.clone()).collect();
        let applications = self
            .store
            .select_applications(&ApplicationFilter::for_jobs(job_ids))?;
        Ok((jobs, applications))
    }

    /// Applications for one job, visible to its owner and to admins.
    pub fn job_applications(
        &self,
        actor: &Actor,
        job_id: &JobId,
        criteria: QueryCriteria<RecordSort>,
    ) -> Result<QueryPage<ApplicationWithJob>, BoardError> {
        let job = self.load_job(job_id)?;
        actor.authorize_job(&job)?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::for_job(job_id.clone()))?;
        let rows = join(applications, std::slice::from_ref(&job));
        Ok(filter_sort(&rows, &criteria)?)
    }

    /// Review transition; only the owning organization or an admin may move an application.
    pub fn update_application_status(
        &self,
        actor: &Actor,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, BoardError> {
        let mut application = self
            .store
            .fetch_application(application_id)?
            .ok_or_else(|| BoardError::not_found("application", application_id))?;
        let job = self.load_job(&application.job_id)?;
        actor.authorize_job(&job)?;

        let now = self.now();
        let change = application.transition(status, now);
        if change.is_noop() {
            debug!(application_id = %application_id, status = status.as_str(), "status unchanged");
            return Ok(application);
        }

        let stored = self
            .store
            .patch_application_status(application_id, StatusPatch::new(change.to, now))?;
        info!(
            application_id = %stored.id,
            from = change.from.as_str(),
            to = change.to.as_str(),
            role = actor.role(),
            "application status changed"
        );
        Ok(stored)
    }

    // Admin back office

    pub fn admin_overview(&self, actor: &Actor) -> Result<AdminOverview, BoardError> {
        actor.require_admin()?;
        let all_applications = ApplicationFilter::default();
        let registered = self.store.select_applications(&ApplicationFilter {
            registered_only: true,
            ..ApplicationFilter::default()
        })?;
        let applicants: BTreeSet<&UserId> = registered
            .iter()
            .filter_map(|application| application.user_id.as_ref())
            .collect();
        let active_jobs = self.store.count_jobs(&JobFilter::public())?;
        let total_applications = self.store.count_applications(&all_applications)?;

        let totals = PlatformTotals {
            total_organizations: self
                .store
                .count_organizations(&OrganizationFilter::default())?,
            active_organizations: self.store.count_organizations(&OrganizationFilter {
                status: Some(OrganizationStatus::Active),
                ..OrganizationFilter::default()
            })?,
            total_applicants: applicants.len(),
            total_jobs: self.store.count_jobs(&JobFilter::default())?,
            active_jobs,
            total_applications,
        };
        let dashboard = DashboardStats {
            active_jobs,
            total_applications,
            shortlisted_applications: self.count_with_status(ApplicationStatus::Shortlisted)?,
            pending_applications: self.count_with_status(ApplicationStatus::Pending)?,
        };

        Ok(AdminOverview { totals, dashboard })
    }

    fn count_with_status(&self, status: ApplicationStatus) -> Result<usize, BoardError> {
        Ok(self.store.count_applications(&ApplicationFilter {
            status: Some(status),
            ..ApplicationFilter::default()
        })?)
    }

    pub fn analytics(&self, actor: &Actor) -> Result<AnalyticsReport, BoardError> {
        actor.require_admin()?;
        let organizations = self
            .store
            .select_organizations(&OrganizationFilter::default())?;
        let jobs = self.store.select_jobs(&JobFilter::default())?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::default())?;
        Ok(AnalyticsReport::build(
            &organizations,
            &jobs,
            &applications,
            self.now(),
        ))
    }

    pub fn admin_jobs(
        &self,
        actor: &Actor,
        criteria: QueryCriteria<JobSort>,
    ) -> Result<QueryPage<JobWithCounts>, BoardError> {
        actor.require_admin()?;
        let jobs = self.store.select_jobs(&JobFilter::default())?;
        self.with_counts(&jobs, &criteria)
    }

    pub fn admin_applications(
        &self,
        actor: &Actor,
        criteria: QueryCriteria<RecordSort>,
    ) -> Result<QueryPage<ApplicationWithJob>, BoardError> {
        actor.require_admin()?;
        let jobs = self.store.select_jobs(&JobFilter::default())?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::default())?;
        Ok(filter_sort(&join(applications, &jobs), &criteria)?)
    }

    pub fn organization_directory(
        &self,
        actor: &Actor,
        criteria: QueryCriteria<RecordSort>,
    ) -> Result<QueryPage<OrganizationActivity>, BoardError> {
        actor.require_admin()?;
        let organizations = self
            .store
            .select_organizations(&OrganizationFilter::default())?;
        let jobs = self.store.select_jobs(&JobFilter::default())?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::default())?;
        let activity = organization_activity(&organizations, &jobs, &applications);
        Ok(filter_sort(&activity, &criteria)?)
    }

    pub fn set_organization_status(
        &self,
        actor: &Actor,
        organization_id: &OrganizationId,
        status: OrganizationStatus,
    ) -> Result<Organization, BoardError> {
        let admin = actor.require_admin()?;
        let mut organization = self
            .store
            .fetch_organization(organization_id)?
            .ok_or_else(|| BoardError::not_found("organization", organization_id))?;

        let now = self.now();
        let change = organization.transition(status, now);
        if change.is_noop() {
            return Ok(organization);
        }

        let stored = self
            .store
            .patch_organization_status(organization_id, StatusPatch::new(change.to, now))?;
        info!(
            organization_id = %stored.id,
            from = change.from.as_str(),
            to = change.to.as_str(),
            admin = %admin.id,
            "organization status changed"
        );
        Ok(stored)
    }

    /// Distinct signed-in applicants; the earliest application supplies contact details.
    pub fn applicants(
        &self,
        actor: &Actor,
        criteria: QueryCriteria<RecordSort>,
    ) -> Result<QueryPage<Applicant>, BoardError> {
        actor.require_admin()?;
        let applications = self.store.select_applications(&ApplicationFilter {
            registered_only: true,
            recency: Recency::OldestFirst,
            ..ApplicationFilter::default()
        })?;
        Ok(filter_sort(&distinct_applicants(&applications), &criteria)?)
    }

    pub fn applicant_applications(
        &self,
        actor: &Actor,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationWithJob>, BoardError> {
        actor.require_admin()?;
        let applications = self
            .store
            .select_applications(&ApplicationFilter::for_user(user_id.clone()))?;
        self.with_jobs(applications)
    }

    pub fn export_jobs(&self, actor: &Actor) -> Result<JobsExport, BoardError> {
        actor.require_admin()?;
        let jobs = self.store.select_jobs(&JobFilter::default())?;
        Ok(JobsExport {
            file_name: export_file_name(self.now()),
            body: jobs_csv(&jobs)?,
        })
    }

    pub fn update_setting(
        &self,
        actor: &Actor,
        key: &str,
        value: String,
    ) -> Result<SiteSetting, BoardError> {
        let admin = actor.require_admin()?;
        match self.store.update_setting(key, value) {
            Ok(setting) => {
                info!(key = %setting.key, admin = %admin.id, "site setting updated");
                Ok(setting)
            }
            Err(RepositoryError::NotFound) => Err(BoardError::not_found("setting", key)),
            Err(other) => Err(other.into()),
        }
    }

    // Helpers

    fn load_job(&self, job_id: &JobId) -> Result<Job, BoardError> {
        self.store
            .fetch_job(job_id)?
            .ok_or_else(|| BoardError::not_found("job", job_id))
    }

    fn with_jobs(
        &self,
        applications: Vec<Application>,
    ) -> Result<Vec<ApplicationWithJob>, BoardError> {
        let job_ids: BTreeSet<JobId> = applications
            .iter()
            .map(|application| application.job_id.clone())
            .collect();
        let jobs = self.store.select_jobs(&JobFilter {
            ids: Some(job_ids.into_iter().collect()),
            ..JobFilter::default()
        })?;
        Ok(join(applications, &jobs))
    }

    fn with_counts(
        &self,
        jobs: &[Job],
        criteria: &QueryCriteria<JobSort>,
    ) -> Result<QueryPage<JobWithCounts>, BoardError> {
        let page = filter_sort(jobs, criteria)?;
        let job_ids = page.items.iter().map(|job| job.id.clone()).collect();
        let applications = self
            .store
            .select_applications(&ApplicationFilter::for_jobs(job_ids))?;

        let mut counts: HashMap<JobId, usize> = HashMap::new();
        for application in applications {
            *counts.entry(application.job_id).or_default() += 1;
        }

        Ok(page.map(|job| JobWithCounts {
            applications_count: counts.get(&job.id).copied().unwrap_or(0),
            job,
        }))
    }
}

/// Pairs each application with its job, dropping applications whose job is gone.
fn join(applications: Vec<Application>, jobs: &[Job]) -> Vec<ApplicationWithJob> {
    let by_id: HashMap<&JobId, &Job> = jobs.iter().map(|job| (&job.id, job)).collect();
    applications
        .into_iter()
        .filter_map(|application| {
            by_id.get(&application.job_id).map(|job| ApplicationWithJob {
                job: job.summary(),
                application,
            })
        })
        .collect()
}
