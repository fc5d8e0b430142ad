use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::breakdown::{department_breakdown, monthly_trend, status_breakdown, top_organizations};
use super::views::{AnalyticsReport, DashboardStats, OrganizationActivity, PlatformTotals};
use crate::board::domain::{
    Applicant, Application, ApplicationStatus, Job, JobId, JobStatus, Organization,
    OrganizationId, OrganizationStatus, UserId,
};

/// Attaches job and application counts to each organization.
///
/// Applications are attributed through their job's owner; applications whose job is no longer
/// in `jobs` are not counted.
pub fn organization_activity(
    organizations: &[Organization],
    jobs: &[Job],
    applications: &[Application],
) -> Vec<OrganizationActivity> {
    let owners: HashMap<&JobId, &OrganizationId> = jobs
        .iter()
        .filter_map(|job| job.organization_id.as_ref().map(|owner| (&job.id, owner)))
        .collect();

    let mut job_counts: HashMap<&OrganizationId, usize> = HashMap::new();
    for owner in owners.values() {
        *job_counts.entry(*owner).or_default() += 1;
    }

    let mut application_counts: HashMap<&OrganizationId, usize> = HashMap::new();
    for application in applications {
        if let Some(owner) = owners.get(&application.job_id) {
            *application_counts.entry(*owner).or_default() += 1;
        }
    }

    organizations
        .iter()
        .map(|organization| OrganizationActivity {
            organization: organization.clone(),
            jobs_count: job_counts.get(&organization.id).copied().unwrap_or(0),
            applications_count: application_counts
                .get(&organization.id)
                .copied()
                .unwrap_or(0),
        })
        .collect()
}

/// Deduplicates applications on `user_id`; the first application seen supplies the contact
/// fields. Anonymous applications are skipped.
pub fn distinct_applicants(applications: &[Application]) -> Vec<Applicant> {
    let mut order: Vec<UserId> = Vec::new();
    let mut applicants: HashMap<UserId, Applicant> = HashMap::new();

    for application in applications {
        let Some(user_id) = application.user_id.as_ref() else {
            continue;
        };

        match applicants.get_mut(user_id) {
            Some(applicant) => {
                applicant.applications_count += 1;
                if application.applied_at < applicant.first_applied_at {
                    applicant.first_applied_at = application.applied_at;
                }
            }
            None => {
                order.push(user_id.clone());
                applicants.insert(
                    user_id.clone(),
                    Applicant {
                        user_id: user_id.clone(),
                        email: application.email.clone(),
                        full_name: application.full_name.clone(),
                        phone: application.phone.clone(),
                        first_applied_at: application.applied_at,
                        applications_count: 1,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|user_id| applicants.remove(&user_id))
        .collect()
}

impl PlatformTotals {
    pub fn from_collections(
        organizations: &[Organization],
        jobs: &[Job],
        applications: &[Application],
    ) -> Self {
        let applicants: HashSet<&UserId> = applications
            .iter()
            .filter_map(|application| application.user_id.as_ref())
            .collect();

        Self {
            total_organizations: organizations.len(),
            active_organizations: organizations
                .iter()
                .filter(|organization| organization.status == OrganizationStatus::Active)
                .count(),
            total_applicants: applicants.len(),
            total_jobs: jobs.len(),
            active_jobs: jobs
                .iter()
                .filter(|job| job.status == JobStatus::Active)
                .count(),
            total_applications: applications.len(),
        }
    }
}

impl DashboardStats {
    /// Stat cards over an already-scoped set of jobs and applications.
    pub fn from_collections(jobs: &[Job], applications: &[Application]) -> Self {
        let breakdown = status_breakdown(applications);
        Self {
            active_jobs: jobs
                .iter()
                .filter(|job| job.status == JobStatus::Active)
                .count(),
            total_applications: applications.len(),
            shortlisted_applications: breakdown.count(ApplicationStatus::Shortlisted),
            pending_applications: breakdown.count(ApplicationStatus::Pending),
        }
    }
}

impl AnalyticsReport {
    pub fn build(
        organizations: &[Organization],
        jobs: &[Job],
        applications: &[Application],
        now: DateTime<Utc>,
    ) -> Self {
        let activity = organization_activity(organizations, jobs, applications);
        Self {
            applications_by_status: status_breakdown(applications).entries(),
            jobs_by_department: department_breakdown(jobs),
            applications_trend: monthly_trend(applications, now),
            top_organizations: top_organizations(&activity),
        }
    }
}
