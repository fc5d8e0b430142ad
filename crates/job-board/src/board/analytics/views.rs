use serde::Serialize;

use crate::board::domain::{ApplicationStatus, Organization, OrganizationId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub shortlisted: usize,
    pub rejected: usize,
}

impl StatusBreakdown {
    pub fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Pending => self.pending,
            ApplicationStatus::Shortlisted => self.shortlisted,
            ApplicationStatus::Rejected => self.rejected,
        }
    }

    pub(crate) fn record(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Shortlisted => self.shortlisted += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.shortlisted + self.rejected
    }

    /// Chart-ready entries in the fixed pending/shortlisted/rejected order.
    pub fn entries(&self) -> Vec<StatusCount> {
        ApplicationStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                name: status.label(),
                value: self.count(status),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// Short month name and two-digit year, e.g. `Jan 24`.
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub applications: usize,
}

/// An organization with the job and application volume derived from its postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationActivity {
    #[serde(flatten)]
    pub organization: Organization,
    pub jobs_count: usize,
    pub applications_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopOrganization {
    pub organization_id: OrganizationId,
    pub name: String,
    pub jobs: usize,
    pub applications: usize,
}

/// Platform-wide counts shown on the admin overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformTotals {
    pub total_organizations: usize,
    pub active_organizations: usize,
    pub total_applicants: usize,
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: usize,
}

/// Stat cards for an organization portal or the admin job dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub active_jobs: usize,
    pub total_applications: usize,
    pub shortlisted_applications: usize,
    pub pending_applications: usize,
}

/// The four admin analytics charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub applications_by_status: Vec<StatusCount>,
    pub jobs_by_department: Vec<DepartmentCount>,
    pub applications_trend: Vec<MonthlyCount>,
    pub top_organizations: Vec<TopOrganization>,
}

/// Admin overview: platform totals plus the job dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminOverview {
    pub totals: PlatformTotals,
    pub dashboard: DashboardStats,
}
