use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::Job;

const NO_DEADLINE: &str = "N/A";
const HEADER: [&str; 7] = [
    "Title",
    "Department",
    "Location",
    "Type",
    "Status",
    "Posted Date",
    "Deadline",
];

#[derive(Debug, Serialize)]
struct JobExportRow<'a> {
    title: &'a str,
    department: &'a str,
    location: &'a str,
    job_type: &'static str,
    status: &'static str,
    posted_date: String,
    deadline: String,
}

impl<'a> From<&'a Job> for JobExportRow<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            title: &job.title,
            department: &job.department,
            location: &job.location,
            job_type: job.job_type.as_str(),
            status: job.status.as_str(),
            posted_date: calendar_date(job.posted_date),
            deadline: job
                .deadline
                .map(calendar_date)
                .unwrap_or_else(|| NO_DEADLINE.to_string()),
        }
    }
}

/// Renders the jobs management export. The header row is written by hand so an empty export
/// still carries it; rows serialize positionally in header order.
pub fn jobs_csv(jobs: &[Job]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for job in jobs {
        writer.serialize(JobExportRow::from(job))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| csv::Error::from(error.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Download name, e.g. `jobs-export-2024-05-01.csv`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("jobs-export-{}.csv", calendar_date(now))
}

fn calendar_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}
