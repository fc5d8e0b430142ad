use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::views::{
    DepartmentCount, MonthlyCount, OrganizationActivity, StatusBreakdown, TopOrganization,
};
use crate::board::domain::{Application, ApplicationStatus, Job};

pub const DEPARTMENT_LIMIT: usize = 6;
pub const TREND_MONTHS: u32 = 6;
pub const TOP_ORGANIZATION_LIMIT: usize = 5;
pub const DISPLAY_NAME_LIMIT: usize = 15;

pub fn status_breakdown(applications: &[Application]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for application in applications {
        breakdown.record(application.status);
    }
    breakdown
}

/// Counts raw stored status labels; labels outside the three known states are skipped.
pub fn status_breakdown_from_labels<I, S>(labels: I) -> StatusBreakdown
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut breakdown = StatusBreakdown::default();
    for label in labels {
        if let Some(status) = ApplicationStatus::from_label(label.as_ref()) {
            breakdown.record(status);
        }
    }
    breakdown
}

/// Top departments by job count. Blank departments are skipped and ties keep the order in
/// which departments were first seen.
pub fn department_breakdown(jobs: &[Job]) -> Vec<DepartmentCount> {
    let mut counts: Vec<DepartmentCount> = Vec::new();

    for job in jobs {
        let department = job.department.trim();
        if department.is_empty() {
            continue;
        }

        match counts.iter_mut().find(|entry| entry.department == department) {
            Some(entry) => entry.count += 1,
            None => counts.push(DepartmentCount {
                department: department.to_string(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(DEPARTMENT_LIMIT);
    counts
}

/// Applications per calendar month for the six months ending with the month of `now`.
///
/// The series always has six entries, oldest first. Months are bucketed in UTC and
/// applications outside the window are dropped.
pub fn monthly_trend(applications: &[Application], now: DateTime<Utc>) -> Vec<MonthlyCount> {
    let mut buckets: Vec<MonthlyCount> = (0..TREND_MONTHS)
        .rev()
        .map(|months_back| {
            let (year, month) = shift_month(now.year(), now.month(), months_back);
            MonthlyCount {
                month: month_label(year, month),
                year,
                month_number: month,
                applications: 0,
            }
        })
        .collect();

    for application in applications {
        let applied = application.applied_at;
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| bucket.year == applied.year() && bucket.month_number == applied.month())
        {
            bucket.applications += 1;
        }
    }

    buckets
}

/// The five organizations with the most applications. Ties keep input order.
pub fn top_organizations(activity: &[OrganizationActivity]) -> Vec<TopOrganization> {
    let mut ranked: Vec<&OrganizationActivity> = activity.iter().collect();
    ranked.sort_by(|a, b| b.applications_count.cmp(&a.applications_count));

    ranked
        .into_iter()
        .take(TOP_ORGANIZATION_LIMIT)
        .map(|entry| TopOrganization {
            organization_id: entry.organization.id.clone(),
            name: display_name(&entry.organization.company_name),
            jobs: entry.jobs_count,
            applications: entry.applications_count,
        })
        .collect()
}

/// Cuts names longer than fifteen characters and appends `...`.
pub fn display_name(name: &str) -> String {
    if name.chars().count() > DISPLAY_NAME_LIMIT {
        let cut: String = name.chars().take(DISPLAY_NAME_LIMIT).collect();
        format!("{cut}...")
    } else {
        name.to_string()
    }
}

fn shift_month(year: i32, month: u32, months_back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - months_back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.format("%b %y").to_string())
        .unwrap_or_default()
}

