use serde::Serialize;

use super::error::ValidationError;

/// Largest resume accepted by default (5 MiB).
pub const DEFAULT_RESUME_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// A resume file as received from the applicant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Durable location returned by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredResume {
    pub url: String,
    pub size: u64,
}

/// Blob-upload capability. Callers validate uploads with [`ResumePolicy`] first.
pub trait ResumeStorage: Send + Sync {
    fn upload(&self, upload: ResumeUpload) -> Result<StoredResume, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload rejected by storage: {0}")]
    Rejected(String),
    #[error("file storage unavailable: {0}")]
    Unavailable(String),
}

/// Content-type and size gate applied before any storage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePolicy {
    max_bytes: u64,
}

impl Default for ResumePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESUME_MAX_BYTES)
    }
}

impl ResumePolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn validate(&self, upload: &ResumeUpload) -> Result<(), ValidationError> {
        check_content_type(&upload.content_type)?;
        if upload.bytes.is_empty() {
            return Err(ValidationError::MissingField("resume"));
        }
        if upload.size() > self.max_bytes {
            return Err(ValidationError::ResumeTooLarge {
                size: upload.size(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Accepts `application/pdf`, with or without parameters.
pub fn check_content_type(content_type: &str) -> Result<(), ValidationError> {
    match content_type.trim().parse::<mime::Mime>() {
        Ok(parsed) if parsed.essence_str() == mime::APPLICATION_PDF.essence_str() => Ok(()),
        _ => Err(ValidationError::ResumeNotPdf(content_type.to_string())),
    }
}
