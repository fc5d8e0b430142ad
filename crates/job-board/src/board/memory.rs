//! In-process adapters for the store, auth provider and blob storage. The API binary serves
//! from these in demo mode and the test suites build on them.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::domain::{
    AdminUser, Application, ApplicationId, ApplicationStatus, Job, JobId, JobStatus,
    Organization, OrganizationId, OrganizationStatus, SiteSetting, UserId,
};
use super::identity::{AuthUser, IdentityError, IdentityProvider, Session, SignUpProfile};
use super::lifecycle::StatusTracked;
use super::repository::{
    ApplicationFilter, BoardStore, JobFilter, OrganizationFilter, RepositoryError, StatusPatch,
};
use super::storage::{ResumeStorage, ResumeUpload, StorageError, StoredResume};

#[derive(Debug, Default)]
struct Tables {
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    organizations: BTreeMap<OrganizationId, Organization>,
    admins: BTreeMap<UserId, AdminUser>,
    settings: BTreeMap<String, SiteSetting>,
}

/// [`BoardStore`] over process memory. Writes can be switched off to simulate an outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    writes_unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_admin(&self, admin: AdminUser) -> Result<(), RepositoryError> {
        self.write()?.admins.insert(admin.id.clone(), admin);
        Ok(())
    }

    pub fn add_setting(&self, setting: SiteSetting) -> Result<(), RepositoryError> {
        self.write()?.settings.insert(setting.key.clone(), setting);
        Ok(())
    }

    /// Makes every subsequent write fail with [`RepositoryError::Unavailable`].
    pub fn set_writes_unavailable(&self, unavailable: bool) {
        self.writes_unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        if self.writes_unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("writes disabled".to_string()));
        }
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl BoardStore for MemoryStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.write()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict(format!("job {} exists", job.id)));
        }
        tables.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.write()?;
        let slot = tables.jobs.get_mut(&job.id).ok_or(RepositoryError::NotFound)?;
        *slot = job.clone();
        Ok(job)
    }

    fn patch_job_status(
        &self,
        id: &JobId,
        patch: StatusPatch<JobStatus>,
    ) -> Result<Job, RepositoryError> {
        apply_status(self.write()?.jobs.get_mut(id), patch)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.read()?.jobs.get(id).cloned())
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        tables.jobs.remove(id).ok_or(RepositoryError::NotFound)?;
        tables
            .applications
            .retain(|_, application| &application.job_id != id);
        Ok(())
    }

    fn select_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.read()?;
        let rows = tables
            .jobs
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        Ok(filter.window(rows))
    }

    fn count_jobs(&self, filter: &JobFilter) -> Result<usize, RepositoryError> {
        Ok(self.select_jobs(filter)?.len())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.jobs.contains_key(&application.job_id) {
            return Err(RepositoryError::Conflict(format!(
                "job {} does not exist",
                application.job_id
            )));
        }
        if tables.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict(format!(
                "application {} exists",
                application.id
            )));
        }
        tables
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn patch_application_status(
        &self,
        id: &ApplicationId,
        patch: StatusPatch<ApplicationStatus>,
    ) -> Result<Application, RepositoryError> {
        apply_status(self.write()?.applications.get_mut(id), patch)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.read()?.applications.get(id).cloned())
    }

    fn select_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.read()?;
        let rows = tables
            .applications
            .values()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect();
        Ok(filter.window(rows))
    }

    fn count_applications(&self, filter: &ApplicationFilter) -> Result<usize, RepositoryError> {
        Ok(self.select_applications(filter)?.len())
    }

    fn insert_organization(
        &self,
        organization: Organization,
    ) -> Result<Organization, RepositoryError> {
        let mut tables = self.write()?;
        let email_taken = tables
            .organizations
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&organization.email));
        if email_taken || tables.organizations.contains_key(&organization.id) {
            return Err(RepositoryError::Conflict(format!(
                "organization {} already registered",
                organization.email
            )));
        }
        tables
            .organizations
            .insert(organization.id.clone(), organization.clone());
        Ok(organization)
    }

    fn patch_organization_status(
        &self,
        id: &OrganizationId,
        patch: StatusPatch<OrganizationStatus>,
    ) -> Result<Organization, RepositoryError> {
        apply_status(self.write()?.organizations.get_mut(id), patch)
    }

    fn fetch_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        Ok(self.read()?.organizations.get(id).cloned())
    }

    fn fetch_organization_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Organization>, RepositoryError> {
        let email = email.trim();
        Ok(self
            .read()?
            .organizations
            .values()
            .find(|organization| organization.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn select_organizations(
        &self,
        filter: &OrganizationFilter,
    ) -> Result<Vec<Organization>, RepositoryError> {
        let tables = self.read()?;
        let rows = tables
            .organizations
            .values()
            .filter(|organization| filter.matches(organization))
            .cloned()
            .collect();
        Ok(filter.window(rows))
    }

    fn count_organizations(&self, filter: &OrganizationFilter) -> Result<usize, RepositoryError> {
        Ok(self.select_organizations(filter)?.len())
    }

    fn fetch_admin(&self, id: &UserId) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(self.read()?.admins.get(id).cloned())
    }

    fn select_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError> {
        Ok(self.read()?.settings.values().cloned().collect())
    }

    fn update_setting(&self, key: &str, value: String) -> Result<SiteSetting, RepositoryError> {
        let mut tables = self.write()?;
        let setting = tables
            .settings
            .get_mut(key)
            .ok_or(RepositoryError::NotFound)?;
        setting.value = value;
        Ok(setting.clone())
    }
}

fn apply_status<R>(
    row: Option<&mut R>,
    patch: StatusPatch<R::Status>,
) -> Result<R, RepositoryError>
where
    R: StatusTracked + Clone,
{
    let row = row.ok_or(RepositoryError::NotFound)?;
    row.store_status(patch.status, patch.updated_at);
    Ok(row.clone())
}

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

/// Email/password accounts with opaque bearer tokens.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, UserId>>,
    sign_out_unavailable: AtomicBool,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account with a caller-chosen id, for seeding admins and fixtures.
    pub fn register_with_id(
        &self,
        id: UserId,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<AuthUser, IdentityError> {
        let key = account_key(email);
        let mut accounts = lock(&self.accounts)?;
        if accounts.contains_key(&key) {
            return Err(IdentityError::EmailTaken(email.trim().to_string()));
        }
        let user = AuthUser {
            id,
            email: email.trim().to_string(),
            full_name,
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        Ok(user)
    }

    pub fn active_sessions(&self) -> usize {
        lock(&self.sessions).map(|sessions| sessions.len()).unwrap_or(0)
    }

    pub fn has_account(&self, email: &str) -> bool {
        lock(&self.accounts)
            .map(|accounts| accounts.contains_key(&account_key(email)))
            .unwrap_or(false)
    }

    /// Makes every subsequent sign-out fail with [`IdentityError::Unavailable`].
    pub fn set_sign_out_unavailable(&self, unavailable: bool) {
        self.sign_out_unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn current_user(&self, token: &str) -> Result<Option<AuthUser>, IdentityError> {
        let Some(user_id) = lock(&self.sessions)?.get(token).cloned() else {
            return Ok(None);
        };
        Ok(lock(&self.accounts)?
            .values()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone()))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let user = {
            let accounts = lock(&self.accounts)?;
            match accounts.get(&account_key(email)) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(IdentityError::InvalidCredentials),
            }
        };

        let access_token = uuid::Uuid::new_v4().simple().to_string();
        lock(&self.sessions)?.insert(access_token.clone(), user.id.clone());
        Ok(Session { access_token, user })
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignUpProfile,
    ) -> Result<AuthUser, IdentityError> {
        let full_name = Some(profile.full_name).filter(|name| !name.trim().is_empty());
        self.register_with_id(UserId::generate(), email, password, full_name)
    }

    fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        if self.sign_out_unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("sign-out disabled".to_string()));
        }
        lock(&self.sessions)?.remove(token);
        Ok(())
    }

    fn delete_user(&self, id: &UserId) -> Result<(), IdentityError> {
        lock(&self.accounts)?.retain(|_, account| &account.user.id != id);
        lock(&self.sessions)?.retain(|_, user_id| user_id != id);
        Ok(())
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, IdentityError> {
    mutex
        .lock()
        .map_err(|_| IdentityError::Unavailable("identity lock poisoned".to_string()))
}

/// Keeps uploaded resumes in memory and hands out URLs under a public base.
#[derive(Debug)]
pub struct MemoryResumeStorage {
    base_url: String,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryResumeStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn stored_urls(&self) -> Vec<String> {
        self.files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ResumeStorage for MemoryResumeStorage {
    fn upload(&self, upload: ResumeUpload) -> Result<StoredResume, StorageError> {
        let url = format!(
            "{}/resumes/{}-{}.pdf",
            self.base_url,
            Utc::now().format("%Y%m%d"),
            uuid::Uuid::new_v4().simple()
        );
        let size = upload.size();
        self.files
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?
            .insert(url.clone(), upload.bytes);
        Ok(StoredResume { url, size })
    }
}
