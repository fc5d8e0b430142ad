use super::domain::OrganizationStatus;
use super::identity::IdentityError;
use super::repository::RepositoryError;
use super::storage::StorageError;

/// Input rejected before any I/O is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("page size must be at least 1")]
    InvalidPageSize,
    #[error("page numbers start at 1")]
    InvalidPage,
    #[error("'{value}' is not a valid {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown sort key '{0}'")]
    UnknownSortKey(String),
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("unknown {kind} status '{value}'")]
    UnknownStatus { kind: &'static str, value: String },
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("resume url must point to a PDF document")]
    ResumeUrlNotPdf,
    #[error("resume must be uploaded as application/pdf (got '{0}')")]
    ResumeNotPdf(String),
    #[error("resume is {size} bytes; the limit is {limit} bytes")]
    ResumeTooLarge { size: u64, limit: u64 },
    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Caller lacks the role or ownership needed for the request.
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("organization account is {}", .0.as_str())]
    OrganizationInactive(OrganizationStatus),
}

/// Error surfaced by the job board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

impl BoardError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
