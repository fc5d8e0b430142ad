use crate::infra::{build_board, seed_demo, DEMO_ADMIN_EMAIL, DEMO_PASSWORD};
use clap::Args;
use job_board::board::analytics::display_name;
use job_board::board::{
    ApplicationReviewTable, ApplicationStatus, BoardError, JobPostingTable, JobSort,
    OrganizationDirectory, OrganizationStatus, QueryCriteria, RecordSort, ResumePolicy,
    ResumeUpload,
};
use job_board::config::{AppConfig, BoardConfig};
use job_board::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the admin moderation portion of the demo.
    #[arg(long)]
    pub(crate) skip_admin: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyticsArgs {
    /// Print the report as JSON instead of a text summary.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ResumeCheckArgs {
    /// Resume file to validate
    pub(crate) path: PathBuf,
    /// Override the configured upload limit in bytes
    #[arg(long)]
    pub(crate) max_bytes: Option<u64>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let board = build_board(&BoardConfig::default());
    let sessions = seed_demo(&board)?;
    let service = &board.service;

    println!("Job board demo");
    println!("- admin login: {DEMO_ADMIN_EMAIL} / {DEMO_PASSWORD}");

    let listing = service.public_jobs(QueryCriteria::new(JobSort::TitleAsc))?;
    println!(
        "\nPublic listings ({} open, page {} of {})",
        listing.total,
        listing.page.unwrap_or(1),
        listing.total_pages
    );
    for job in &listing.items {
        println!(
            "  - {} | {} | {} | {}",
            job.title,
            job.department,
            job.location,
            job.job_type.label()
        );
    }

    let portal = &sessions.organization;
    let jobs = service.organization_jobs(portal, QueryCriteria::default())?;
    let mut job_table = JobPostingTable::new(jobs.items);
    println!("\nOrganization portal");
    for row in job_table.rows() {
        println!(
            "  - {} ({}) with {} application(s)",
            row.job.title,
            row.job.status.label(),
            row.applications_count
        );
    }

    let applications =
        service.organization_applications(portal, QueryCriteria::new(RecordSort::NameAsc))?;
    let mut review = ApplicationReviewTable::new(applications.items);
    if let Some(first) = review.rows().first().map(|row| row.application.id.clone()) {
        let row = review.set_status(service, portal, &first, ApplicationStatus::Shortlisted)?;
        println!(
            "  Shortlisted {} for {}",
            row.application.full_name, row.job.title
        );
    }
    let breakdown = review.breakdown();
    println!(
        "  Review queue: {} pending | {} shortlisted | {} rejected",
        breakdown.pending, breakdown.shortlisted, breakdown.rejected
    );

    if let Some(first_job) = job_table.rows().first().map(|row| row.job.id.clone()) {
        let status = job_table.toggle(service, portal, &first_job)?;
        println!("  Toggled {} to {}", first_job, status.label());
    }

    let mine = service.my_applications(&sessions.applicant)?;
    println!("\nApplicant dashboard ({} application(s))", mine.len());
    for entry in &mine {
        println!(
            "  - {} -> {}",
            entry.job.title,
            entry.application.status.label()
        );
    }

    if args.skip_admin {
        return Ok(());
    }

    let admin = &sessions.admin;
    let overview = service.admin_overview(admin)?;
    println!("\nAdmin overview");
    println!(
        "  {} organizations ({} active) | {} jobs ({} active) | {} applications from {} applicants",
        overview.totals.total_organizations,
        overview.totals.active_organizations,
        overview.totals.total_jobs,
        overview.totals.active_jobs,
        overview.totals.total_applications,
        overview.totals.total_applicants
    );

    let directory = service.organization_directory(admin, QueryCriteria::default())?;
    let mut organizations = OrganizationDirectory::new(directory.items);
    if let Some(last) = organizations
        .rows()
        .last()
        .map(|row| row.organization.id.clone())
    {
        let row = organizations.set_status(service, admin, &last, OrganizationStatus::Suspended)?;
        println!(
            "  Suspended {} ({})",
            display_name(&row.organization.company_name),
            row.organization.status.label()
        );
    }

    let export = service.export_jobs(admin)?;
    println!(
        "  Export {} ({} rows)",
        export.file_name,
        export.body.lines().count().saturating_sub(1)
    );

    Ok(())
}

pub(crate) fn run_analytics(args: AnalyticsArgs) -> Result<(), AppError> {
    let board = build_board(&BoardConfig::default());
    let sessions = seed_demo(&board)?;
    let report = board.service.analytics(&sessions.admin)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Applications by status");
    for entry in &report.applications_by_status {
        println!("  - {}: {}", entry.name, entry.value);
    }
    println!("Jobs by department");
    for entry in &report.jobs_by_department {
        println!("  - {}: {}", entry.department, entry.count);
    }
    println!("Applications trend");
    for entry in &report.applications_trend {
        println!("  - {}: {}", entry.month, entry.applications);
    }
    println!("Top organizations");
    for entry in &report.top_organizations {
        println!(
            "  - {}: {} job(s), {} application(s)",
            entry.name, entry.jobs, entry.applications
        );
    }

    Ok(())
}

pub(crate) fn run_resume_check(args: ResumeCheckArgs) -> Result<(), AppError> {
    let ResumeCheckArgs { path, max_bytes } = args;
    let policy = match max_bytes {
        Some(limit) => ResumePolicy::new(limit),
        None => AppConfig::load()?.board.policy().resume,
    };

    let bytes = std::fs::read(&path)?;
    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let upload = ResumeUpload {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        content_type,
        bytes,
    };

    match policy.validate(&upload) {
        Ok(()) => {
            println!(
                "{} accepted ({} bytes, {}, limit {} bytes)",
                path.display(),
                upload.size(),
                upload.content_type,
                policy.max_bytes()
            );
            Ok(())
        }
        Err(err) => Err(BoardError::from(err).into()),
    }
}
