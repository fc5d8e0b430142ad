use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::board::domain::{
    AdminUser, Application, ApplicationId, ApplicationStatus, ApplicationSubmission, Job,
    JobDraft, JobId, JobStatus, JobType, Organization, OrganizationId, OrganizationSignup,
    OrganizationStatus, SiteSetting, UserId,
};
use crate::board::identity::Actor;
use crate::board::memory::{MemoryIdentityProvider, MemoryResumeStorage, MemoryStore};
use crate::board::repository::BoardStore;
use crate::board::service::{BoardPolicy, JobBoardService};

pub(super) type TestService = JobBoardService<MemoryStore, MemoryIdentityProvider, MemoryResumeStorage>;

pub(super) const ADMIN_EMAIL: &str = "ops@jobs.example.com";
pub(super) const ORG_EMAIL: &str = "talent@northwind.example";
pub(super) const OTHER_ORG_EMAIL: &str = "people@contoso.example";
pub(super) const APPLICANT_EMAIL: &str = "jane.doe@example.com";
pub(super) const PASSWORD: &str = "correct-horse";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn job(id: &str, title: &str, department: &str, status: JobStatus) -> Job {
    Job {
        id: JobId::from(id),
        title: title.to_string(),
        department: department.to_string(),
        location: "Remote".to_string(),
        job_type: JobType::FullTime,
        description: format!("{title} role"),
        requirements: String::new(),
        responsibilities: String::new(),
        salary_range: None,
        posted_date: days_ago(10),
        deadline: None,
        status,
        organization_id: None,
        created_at: days_ago(10),
        updated_at: days_ago(10),
    }
}

pub(super) fn owned_job(id: &str, title: &str, owner: &OrganizationId) -> Job {
    Job {
        organization_id: Some(owner.clone()),
        ..job(id, title, "Engineering", JobStatus::Active)
    }
}

pub(super) fn application(
    id: &str,
    job_id: &str,
    full_name: &str,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
) -> Application {
    let email = format!(
        "{}@example.com",
        full_name.to_ascii_lowercase().replace(' ', ".")
    );
    Application {
        id: ApplicationId::from(id),
        job_id: JobId::from(job_id),
        full_name: full_name.to_string(),
        email,
        phone: "+1 555 0100".to_string(),
        cover_letter: None,
        resume_url: None,
        status,
        applied_at,
        created_at: applied_at,
        updated_at: applied_at,
        user_id: None,
    }
}

pub(super) fn organization(id: &str, company_name: &str, status: OrganizationStatus) -> Organization {
    Organization {
        id: OrganizationId::from(id),
        company_name: company_name.to_string(),
        contact_person: "Ada Lovelace".to_string(),
        email: format!("hr@{id}.example"),
        status,
        created_at: days_ago(30),
        updated_at: days_ago(30),
    }
}

pub(super) fn draft(title: &str, department: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        department: department.to_string(),
        location: "Lagos".to_string(),
        job_type: JobType::Contract,
        description: "<p>Own the ledger.</p>".to_string(),
        requirements: "CPA".to_string(),
        responsibilities: "Reconcile accounts".to_string(),
        salary_range: Some("$80k - $95k".to_string()),
        deadline: None,
    }
}

pub(super) fn submission(full_name: &str, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: "+1 555 0101".to_string(),
        cover_letter: Some("I would love to join.".to_string()),
        resume_url: Some("https://files.example.com/resumes/jane.pdf".to_string()),
    }
}

pub(super) fn signup(company_name: &str, email: &str) -> OrganizationSignup {
    OrganizationSignup {
        company_name: company_name.to_string(),
        contact_person: "Grace Hopper".to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
    }
}

pub(super) fn build_service_with(policy: BoardPolicy) -> TestService {
    JobBoardService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryIdentityProvider::new()),
        Arc::new(MemoryResumeStorage::new("https://files.example.com")),
        policy,
    )
    .with_clock(now)
}

pub(super) fn build_service() -> TestService {
    build_service_with(BoardPolicy::default())
}

/// A service with one admin, two organizations, one applicant and a small job set.
pub(super) struct Board {
    pub(super) service: Arc<TestService>,
    pub(super) admin_token: String,
    pub(super) org_token: String,
    pub(super) org_id: OrganizationId,
    pub(super) other_org_token: String,
    pub(super) other_org_id: OrganizationId,
    pub(super) applicant_token: String,
    pub(super) org_job: JobId,
    pub(super) other_org_job: JobId,
    pub(super) inactive_job: JobId,
}

impl Board {
    pub(super) fn actor(&self, token: &str) -> Actor {
        self.service.resolve(Some(token)).expect("token resolves")
    }

    pub(super) fn admin(&self) -> Actor {
        self.actor(&self.admin_token)
    }

    pub(super) fn org(&self) -> Actor {
        self.actor(&self.org_token)
    }

    pub(super) fn other_org(&self) -> Actor {
        self.actor(&self.other_org_token)
    }

    pub(super) fn applicant(&self) -> Actor {
        self.actor(&self.applicant_token)
    }
}

pub(super) fn seeded_board() -> Board {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(MemoryIdentityProvider::new());
    let service = JobBoardService::new(
        store.clone(),
        identity.clone(),
        Arc::new(MemoryResumeStorage::new("https://files.example.com")),
        BoardPolicy::default(),
    )
    .with_clock(now);

    let admin_id = UserId::from("admin-1");
    identity
        .register_with_id(admin_id.clone(), ADMIN_EMAIL, PASSWORD, None)
        .expect("admin account");
    store
        .add_admin(AdminUser {
            id: admin_id,
            email: ADMIN_EMAIL.to_string(),
            full_name: "Platform Ops".to_string(),
        })
        .expect("admin row");
    store
        .add_setting(SiteSetting {
            key: "contact_email".to_string(),
            value: "hello@jobs.example.com".to_string(),
            description: "Public contact address".to_string(),
        })
        .expect("setting row");

    let org = service
        .signup_organization(signup("Northwind Traders", ORG_EMAIL))
        .expect("org signup");
    let other = service
        .signup_organization(signup("Contoso", OTHER_ORG_EMAIL))
        .expect("other org signup");
    service
        .register_applicant(APPLICANT_EMAIL, PASSWORD, "Jane Doe")
        .expect("applicant signup");

    let admin_token = service.sign_in(ADMIN_EMAIL, PASSWORD).expect("admin login").access_token;
    let org_token = service
        .organization_login(ORG_EMAIL, PASSWORD)
        .expect("org login")
        .session
        .access_token;
    let other_org_token = service
        .organization_login(OTHER_ORG_EMAIL, PASSWORD)
        .expect("other org login")
        .session
        .access_token;
    let applicant_token = service
        .sign_in(APPLICANT_EMAIL, PASSWORD)
        .expect("applicant login")
        .access_token;

    let org_job = store
        .insert_job(owned_job("job-finance", "Finance Analyst", &org.id))
        .expect("org job")
        .id;
    let other_org_job = store
        .insert_job(owned_job("job-legal", "Legal Counsel", &other.id))
        .expect("other org job")
        .id;
    let inactive_job = store
        .insert_job(Job {
            status: JobStatus::Inactive,
            ..owned_job("job-archived", "Archived Role", &org.id)
        })
        .expect("inactive job")
        .id;

    Board {
        service: Arc::new(service),
        admin_token,
        org_token,
        org_id: org.id,
        other_org_token,
        other_org_id: other.id,
        applicant_token,
        org_job,
        other_org_job,
        inactive_job,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
