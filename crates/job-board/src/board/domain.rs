use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier wrapper for posted jobs.
    JobId
);
string_id!(
    /// Identifier wrapper for submitted applications.
    ApplicationId
);
string_id!(
    /// Identifier wrapper for employer accounts.
    OrganizationId
);
string_id!(
    /// Identity issued by the auth provider.
    UserId
);

impl From<&UserId> for OrganizationId {
    fn from(value: &UserId) -> Self {
        Self(value.0.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl JobType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::FullTime,
            Self::PartTime,
            Self::Contract,
            Self::Internship,
            Self::Temporary,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Internship => "internship",
            Self::Temporary => "temporary",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Contract => "Contract",
            Self::Internship => "Internship",
            Self::Temporary => "Temporary",
        }
    }
}

impl FromStr for JobType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| ValidationError::UnknownStatus {
                kind: "job type",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Inactive,
}

impl JobStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl FromStr for JobStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ValidationError::UnknownStatus {
                kind: "job",
                value: other.to_string(),
            }),
        }
    }
}

/// Review state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Shortlisted, Self::Rejected]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shortlisted => "shortlisted",
            Self::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Shortlisted => "Shortlisted",
            Self::Rejected => "Rejected",
        }
    }

    /// Parses a stored label, returning `None` for anything outside the three known states.
    pub fn from_label(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value.trim()).ok_or_else(|| ValidationError::UnknownStatus {
            kind: "application",
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    Active,
    Suspended,
    Pending,
}

impl OrganizationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Pending => "pending",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
            Self::Pending => "Pending",
        }
    }
}

impl FromStr for OrganizationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "pending" => Ok(Self::Pending),
            other => Err(ValidationError::UnknownStatus {
                kind: "organization",
                value: other.to_string(),
            }),
        }
    }
}

/// A posted position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub salary_range: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub organization_id: Option<OrganizationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Builds a fresh, active job from a validated draft.
    pub fn from_draft(
        draft: JobDraft,
        organization_id: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self {
            id: JobId::generate(),
            title: draft.title.trim().to_string(),
            department: draft.department.trim().to_string(),
            location: draft.location.trim().to_string(),
            job_type: draft.job_type,
            description: draft.description,
            requirements: draft.requirements,
            responsibilities: draft.responsibilities,
            salary_range: non_blank(draft.salary_range),
            posted_date: now,
            deadline: draft.deadline,
            status: JobStatus::Active,
            organization_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies an edited draft, keeping identity, ownership, status and posting date.
    pub fn apply_draft(&mut self, draft: JobDraft, now: DateTime<Utc>) -> Result<(), ValidationError> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.department = draft.department.trim().to_string();
        self.location = draft.location.trim().to_string();
        self.job_type = draft.job_type;
        self.description = draft.description;
        self.requirements = draft.requirements;
        self.responsibilities = draft.responsibilities;
        self.salary_range = non_blank(draft.salary_range);
        self.deadline = draft.deadline;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_public(&self) -> bool {
        self.status == JobStatus::Active
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            department: self.department.clone(),
            location: self.location.clone(),
            job_type: self.job_type,
            status: self.status,
            organization_id: self.organization_id.clone(),
        }
    }
}

/// Editable job fields supplied by an organization or admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type", default = "default_job_type")]
    pub job_type: JobType,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub responsibilities: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

fn default_job_type() -> JobType {
    JobType::FullTime
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("department", &self.department)?;
        require("location", &self.location)?;
        require("description", &self.description)?;
        Ok(())
    }
}

/// Job fields carried alongside an application in review tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    pub organization_id: Option<OrganizationId>,
}

/// A candidate's submission against one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<UserId>,
}

impl Application {
    pub fn from_submission(
        job_id: JobId,
        submission: ApplicationSubmission,
        user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        submission.validate()?;
        Ok(Self {
            id: ApplicationId::generate(),
            job_id,
            full_name: submission.full_name.trim().to_string(),
            email: submission.email.trim().to_string(),
            phone: submission.phone.trim().to_string(),
            cover_letter: non_blank(submission.cover_letter),
            resume_url: non_blank(submission.resume_url),
            status: ApplicationStatus::Pending,
            applied_at: now,
            created_at: now,
            updated_at: now,
            user_id,
        })
    }
}

/// Public application form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
}

impl ApplicationSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("full_name", &self.full_name)?;
        validate_email(&self.email)?;
        require("phone", &self.phone)?;
        if let Some(url) = self.resume_url.as_deref().filter(|url| !url.trim().is_empty()) {
            validate_resume_url(url)?;
        }
        Ok(())
    }
}

/// An application joined with the job it was submitted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job: JobSummary,
}

/// A job annotated with how many applications it has received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobWithCounts {
    #[serde(flatten)]
    pub job: Job,
    pub applications_count: usize,
}

/// An employer account that owns jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub status: OrganizationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organization signup form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrganizationSignup {
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl OrganizationSignup {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("company_name", &self.company_name)?;
        require("contact_person", &self.contact_person)?;
        validate_email(&self.email)?;
        require("password", &self.password)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Platform operator with cross-organization visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

/// Key/value configuration surfaced on public pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
    pub description: String,
}

/// Distinct authenticated applicant derived from their applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applicant {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub first_applied_at: DateTime<Utc>,
    pub applications_count: usize,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Light structural check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .filter(|part| !part.is_empty())
                    .count()
                    >= 2
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid && !trimmed.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Resume links must be http(s) URLs whose path ends in `.pdf`.
pub fn validate_resume_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    let path = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let has_scheme = path.starts_with("https://") || path.starts_with("http://");

    if has_scheme && path.ends_with(".pdf") {
        Ok(())
    } else {
        Err(ValidationError::ResumeUrlNotPdf)
    }
}
