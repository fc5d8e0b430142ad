use job_board::board::{
    Actor, AdminUser, ApplicationSubmission, BoardError, JobDraft, JobId, JobType,
    JobBoardService, MemoryIdentityProvider, MemoryResumeStorage, MemoryStore, OrganizationSignup,
    SiteSetting, UserId,
};
use job_board::config::BoardConfig;
use job_board::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type BoardService =
    JobBoardService<MemoryStore, MemoryIdentityProvider, MemoryResumeStorage>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory adapters wired into a service, with handles kept for seeding.
pub(crate) struct Board {
    pub(crate) service: Arc<BoardService>,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) identity: Arc<MemoryIdentityProvider>,
}

pub(crate) fn build_board(config: &BoardConfig) -> Board {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(MemoryIdentityProvider::new());
    let files = Arc::new(MemoryResumeStorage::new(config.public_base_url.clone()));
    let service = Arc::new(JobBoardService::new(
        store.clone(),
        identity.clone(),
        files,
        config.policy(),
    ));

    Board {
        service,
        store,
        identity,
    }
}

impl Board {
    /// Registers an admin account and its membership row.
    pub(crate) fn seed_admin(&self, email: &str, password: &str) -> Result<AdminUser, AppError> {
        let id = UserId::generate();
        self.identity
            .register_with_id(id.clone(), email, password, Some("Administrator".to_string()))
            .map_err(BoardError::from)?;
        let admin = AdminUser {
            id,
            email: email.trim().to_string(),
            full_name: "Administrator".to_string(),
        };
        self.store
            .add_admin(admin.clone())
            .map_err(BoardError::from)?;
        info!(email = %admin.email, "admin account seeded");
        Ok(admin)
    }
}

pub(crate) const DEMO_ADMIN_EMAIL: &str = "admin@demo.jobs";
pub(crate) const DEMO_PASSWORD: &str = "demo-password";

/// Tokens for the accounts created by [`seed_demo`].
pub(crate) struct DemoSessions {
    pub(crate) admin: Actor,
    pub(crate) organization: Actor,
    pub(crate) applicant: Actor,
    pub(crate) jobs: Vec<JobId>,
}

const DEMO_ORGANIZATIONS: [(&str, &str); 2] = [
    ("Harbor Freight Logistics", "talent@harbor.demo"),
    ("Lumen Health", "careers@lumen.demo"),
];

const DEMO_JOBS: [(&str, &str, &str, JobType); 4] = [
    ("Operations Coordinator", "Operations", "Lagos", JobType::FullTime),
    ("Finance Analyst", "Finance", "Remote", JobType::Contract),
    ("Registered Nurse", "Clinical", "Abuja", JobType::FullTime),
    ("Data Intern", "Engineering", "Remote", JobType::Internship),
];

const DEMO_APPLICANTS: [(&str, &str); 3] = [
    ("Chiamaka Obi", "chiamaka@applicants.demo"),
    ("Daniel Mensah", "daniel@applicants.demo"),
    ("Ifeoma Nwosu", "ifeoma@applicants.demo"),
];

/// Populates the board with a small, realistic data set and returns signed-in actors.
pub(crate) fn seed_demo(board: &Board) -> Result<DemoSessions, AppError> {
    let service = &board.service;
    board.seed_admin(DEMO_ADMIN_EMAIL, DEMO_PASSWORD)?;
    board
        .store
        .add_setting(SiteSetting {
            key: "contact_email".to_string(),
            value: "hello@demo.jobs".to_string(),
            description: "Public contact address shown in the footer".to_string(),
        })
        .map_err(BoardError::from)?;

    for (company_name, email) in DEMO_ORGANIZATIONS {
        service.signup_organization(OrganizationSignup {
            company_name: company_name.to_string(),
            contact_person: "Hiring Lead".to_string(),
            email: email.to_string(),
            password: DEMO_PASSWORD.to_string(),
            confirm_password: DEMO_PASSWORD.to_string(),
        })?;
    }

    let admin = sign_in(service, DEMO_ADMIN_EMAIL)?;
    let organization_token = service
        .organization_login(DEMO_ORGANIZATIONS[0].1, DEMO_PASSWORD)?
        .session
        .access_token;
    let organization = service.resolve(Some(&organization_token))?;
    let partner_token = service
        .organization_login(DEMO_ORGANIZATIONS[1].1, DEMO_PASSWORD)?
        .session
        .access_token;
    let partner = service.resolve(Some(&partner_token))?;

    let mut jobs = Vec::new();
    for (index, (title, department, location, job_type)) in DEMO_JOBS.into_iter().enumerate() {
        let owner = if index % 2 == 0 { &organization } else { &partner };
        let job = service.create_job(
            owner,
            JobDraft {
                title: title.to_string(),
                department: department.to_string(),
                location: location.to_string(),
                job_type,
                description: format!("<p>{title} opening in {location}.</p>"),
                requirements: String::new(),
                responsibilities: String::new(),
                salary_range: None,
                deadline: None,
            },
        )?;
        jobs.push(job.id);
    }

    let (registered_name, registered_email) = DEMO_APPLICANTS[0];
    service.register_applicant(registered_email, DEMO_PASSWORD, registered_name)?;
    let applicant = sign_in(service, registered_email)?;
    let walk_in = Actor::Anonymous;

    for (index, (full_name, email)) in DEMO_APPLICANTS.into_iter().enumerate() {
        let actor = if index == 0 { &applicant } else { &walk_in };
        for job_id in jobs.iter().skip(index).step_by(2) {
            service.submit_application(
                actor,
                job_id,
                ApplicationSubmission {
                    full_name: full_name.to_string(),
                    email: email.to_string(),
                    phone: "+234 700 000 0000".to_string(),
                    cover_letter: None,
                    resume_url: None,
                },
            )?;
        }
    }

    info!(jobs = jobs.len(), "demo data seeded");
    Ok(DemoSessions {
        admin,
        organization,
        applicant,
        jobs,
    })
}

fn sign_in(service: &BoardService, email: &str) -> Result<Actor, AppError> {
    let session = service.sign_in(email, DEMO_PASSWORD)?;
    Ok(service.resolve(Some(&session.access_token))?)
}
