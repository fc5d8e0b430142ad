//! Job board core: public listings, applicant intake, the organization portal and the admin
//! back office.
//!
//! The query and aggregation engines are pure functions over in-memory collections. Everything
//! that touches I/O goes through three narrow seams: [`BoardStore`] for rows,
//! [`IdentityProvider`] for accounts and [`ResumeStorage`] for uploaded files. The
//! [`JobBoardService`] composes them and [`board_router`] exposes it over HTTP.

pub mod analytics;
pub mod domain;
pub mod error;
pub mod export;
pub mod identity;
pub mod lifecycle;
pub mod memory;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod tables;

#[cfg(test)]
mod tests;

pub use analytics::{
    AdminOverview, AnalyticsReport, DashboardStats, OrganizationActivity, PlatformTotals,
    StatusBreakdown,
};
pub use domain::{
    AdminUser, Applicant, Application, ApplicationId, ApplicationStatus, ApplicationSubmission,
    ApplicationWithJob, Job, JobDraft, JobId, JobStatus, JobSummary, JobType, JobWithCounts,
    Organization, OrganizationId, OrganizationSignup, OrganizationStatus, SiteSetting, UserId,
};
pub use error::{AuthorizationError, BoardError, ValidationError};
pub use identity::{resolve_actor, Actor, AuthUser, IdentityError, IdentityProvider, Session};
pub use lifecycle::{StatusChange, StatusTracked};
pub use memory::{MemoryIdentityProvider, MemoryResumeStorage, MemoryStore};
pub use query::{
    filter_sort, JobSort, PageRequest, QueryCriteria, QueryPage, RecordSort, ALL,
    DEFAULT_PAGE_SIZE,
};
pub use repository::{
    ApplicationFilter, BoardStore, JobFilter, OrganizationFilter, Ownership, Recency,
    RepositoryError, StatusPatch,
};
pub use router::board_router;
pub use service::{BoardPolicy, JobBoardService, JobsExport, OrganizationSession};
pub use storage::{
    ResumePolicy, ResumeStorage, ResumeUpload, StorageError, StoredResume,
    DEFAULT_RESUME_MAX_BYTES,
};
pub use tables::{ApplicationReviewTable, JobPostingTable, OrganizationDirectory};
