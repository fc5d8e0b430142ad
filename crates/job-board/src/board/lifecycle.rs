//! Status state machines for applications, jobs and organizations.
//!
//! Application review states move freely between pending, shortlisted and rejected; jobs toggle
//! between active and inactive; organization moderation is admin-only and gates portal access.
//! Who may perform a transition is decided by [`Actor`](super::identity::Actor); this module
//! only applies the change.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Application, ApplicationStatus, Job, JobStatus, Organization, OrganizationStatus,
};

/// Before/after pair returned by every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange<S> {
    pub from: S,
    pub to: S,
}

impl<S: PartialEq> StatusChange<S> {
    /// Re-applying the current state succeeds without touching the record.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// A record with a single status column.
pub trait StatusTracked {
    type Status: Copy + PartialEq;

    fn status(&self) -> Self::Status;
    fn store_status(&mut self, status: Self::Status, now: DateTime<Utc>);

    fn transition(&mut self, to: Self::Status, now: DateTime<Utc>) -> StatusChange<Self::Status> {
        let change = StatusChange {
            from: self.status(),
            to,
        };
        if !change.is_noop() {
            self.store_status(to, now);
        }
        change
    }
}

impl StatusTracked for Application {
    type Status = ApplicationStatus;

    fn status(&self) -> ApplicationStatus {
        self.status
    }

    fn store_status(&mut self, status: ApplicationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

impl StatusTracked for Job {
    type Status = JobStatus;

    fn status(&self) -> JobStatus {
        self.status
    }

    fn store_status(&mut self, status: JobStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

impl StatusTracked for Organization {
    type Status = OrganizationStatus;

    fn status(&self) -> OrganizationStatus {
        self.status
    }

    fn store_status(&mut self, status: OrganizationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

impl JobStatus {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl OrganizationStatus {
    pub const fn permits_portal_access(self) -> bool {
        matches!(self, Self::Active)
    }
}
