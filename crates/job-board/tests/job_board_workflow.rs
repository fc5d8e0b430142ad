//! Integration specifications for the job board: public browsing and applying, the organization
//! review portal and the admin back office.
//!
//! Scenarios drive the public service facade and HTTP router over the in-memory adapters, the
//! same way the API binary wires them in demo mode.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use job_board::board::{
        AdminUser, ApplicationSubmission, BoardPolicy, JobBoardService, JobDraft, JobType,
        MemoryIdentityProvider, MemoryResumeStorage, MemoryStore, OrganizationSignup, UserId,
    };

    pub(super) type Service =
        JobBoardService<MemoryStore, MemoryIdentityProvider, MemoryResumeStorage>;

    pub(super) const ADMIN_EMAIL: &str = "admin@careers.example";
    pub(super) const PASSWORD: &str = "s3cret-pass";

    pub(super) fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 15, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn build_service() -> Arc<Service> {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(MemoryIdentityProvider::new());
        let admin_id = UserId::from("admin-root");
        identity
            .register_with_id(admin_id.clone(), ADMIN_EMAIL, PASSWORD, None)
            .expect("admin account");
        store
            .add_admin(AdminUser {
                id: admin_id,
                email: ADMIN_EMAIL.to_string(),
                full_name: "Root Admin".to_string(),
            })
            .expect("admin row");

        Arc::new(
            JobBoardService::new(
                store,
                identity,
                Arc::new(MemoryResumeStorage::new("https://cdn.careers.example")),
                BoardPolicy::default(),
            )
            .with_clock(clock),
        )
    }

    pub(super) fn signup(company_name: &str, email: &str) -> OrganizationSignup {
        OrganizationSignup {
            company_name: company_name.to_string(),
            contact_person: "Hiring Manager".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            confirm_password: PASSWORD.to_string(),
        }
    }

    pub(super) fn draft(title: &str, department: &str, location: &str) -> JobDraft {
        JobDraft {
            title: title.to_string(),
            department: department.to_string(),
            location: location.to_string(),
            job_type: JobType::FullTime,
            description: "<p>Join a growing team.</p>".to_string(),
            requirements: String::new(),
            responsibilities: String::new(),
            salary_range: None,
            deadline: None,
        }
    }

    pub(super) fn submission(full_name: &str, email: &str) -> ApplicationSubmission {
        ApplicationSubmission {
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: "+234 800 000 0000".to_string(),
            cover_letter: None,
            resume_url: Some("https://cdn.careers.example/resumes/cv.pdf".to_string()),
        }
    }
}

mod portal {
    use super::common::*;
    use job_board::board::{
        Actor, ApplicationReviewTable, ApplicationStatus, BoardError, JobSort, QueryCriteria,
        RecordSort,
    };

    #[test]
    fn organization_posts_reviews_and_reports() {
        let service = build_service();
        service
            .signup_organization(signup("Kite Logistics", "jobs@kite.example"))
            .expect("signup");
        let session = service
            .organization_login("jobs@kite.example", PASSWORD)
            .expect("login");
        let org = service
            .resolve(Some(&session.session.access_token))
            .expect("token resolves");

        let dispatcher = service
            .create_job(&org, draft("Dispatcher", "Operations", "Abuja"))
            .expect("posted");
        service
            .create_job(&org, draft("Fleet Analyst", "Finance", "Lagos"))
            .expect("posted");

        let browse = service
            .public_jobs(QueryCriteria::new(JobSort::TitleAsc).filter("location", "Abuja"))
            .expect("browse");
        assert_eq!(browse.total, 1);
        assert_eq!(browse.items[0].id, dispatcher.id);

        for (name, email) in [("Ngozi Eze", "ngozi@example.com"), ("Tunde Bello", "tunde@example.com")] {
            service
                .submit_application(&Actor::Anonymous, &dispatcher.id, submission(name, email))
                .expect("applied");
        }

        let rows = service
            .organization_applications(&org, QueryCriteria::new(RecordSort::NameAsc))
            .expect("applications")
            .items;
        let mut table = ApplicationReviewTable::new(rows);
        let ngozi = table.rows()[0].application.id.clone();
        table
            .set_status(&service, &org, &ngozi, ApplicationStatus::Shortlisted)
            .expect("shortlisted");

        let stats = service.organization_stats(&org).expect("stats");
        assert_eq!(stats.active_jobs, 2);
        assert_eq!(stats.total_applications, 2);
        assert_eq!(stats.shortlisted_applications, 1);
        assert_eq!(stats.pending_applications, 1);
        assert_eq!(table.breakdown().shortlisted, 1);

        let tracked = service
            .track_applications("ngozi@example.com")
            .expect("tracked");
        assert_eq!(tracked[0].application.status, ApplicationStatus::Shortlisted);
        assert_eq!(tracked[0].job.title, "Dispatcher");
    }

    #[test]
    fn closed_jobs_stop_accepting_applications() {
        let service = build_service();
        service
            .signup_organization(signup("Kite Logistics", "jobs@kite.example"))
            .expect("signup");
        let token = service
            .organization_login("jobs@kite.example", PASSWORD)
            .expect("login")
            .session
            .access_token;
        let org = service.resolve(Some(&token)).expect("token resolves");
        let job = service
            .create_job(&org, draft("Dispatcher", "Operations", "Abuja"))
            .expect("posted");

        service.toggle_job(&org, &job.id).expect("closed");

        assert!(matches!(
            service.submit_application(
                &Actor::Anonymous,
                &job.id,
                submission("Ngozi Eze", "ngozi@example.com")
            ),
            Err(BoardError::NotFound { .. })
        ));
        assert_eq!(
            service
                .public_jobs(QueryCriteria::default())
                .expect("browse")
                .total,
            0
        );
    }
}

mod admin {
    use super::common::*;
    use job_board::board::{
        Actor, AuthorizationError, BoardError, OrganizationDirectory, OrganizationStatus,
        QueryCriteria,
    };

    #[test]
    fn admin_moderates_and_exports() {
        let service = build_service();
        let admin_token = service.sign_in(ADMIN_EMAIL, PASSWORD).expect("admin login").access_token;
        let admin = service.resolve(Some(&admin_token)).expect("admin resolves");

        service
            .signup_organization(signup("Kite Logistics", "jobs@kite.example"))
            .expect("signup");
        let org_token = service
            .organization_login("jobs@kite.example", PASSWORD)
            .expect("login")
            .session
            .access_token;
        let org = service.resolve(Some(&org_token)).expect("org resolves");
        let job = service
            .create_job(&org, draft("Dispatcher", "Operations", "Abuja"))
            .expect("posted");

        service
            .register_applicant("amaka@example.com", PASSWORD, "Amaka Obi")
            .expect("applicant");
        let applicant_token = service
            .sign_in("amaka@example.com", PASSWORD)
            .expect("applicant login")
            .access_token;
        let applicant = service
            .resolve(Some(&applicant_token))
            .expect("applicant resolves");
        service
            .submit_application(&applicant, &job.id, submission("Amaka Obi", "amaka@example.com"))
            .expect("applied");
        service
            .submit_application(&Actor::Anonymous, &job.id, submission("Guest", "guest@example.com"))
            .expect("applied");

        let overview = service.admin_overview(&admin).expect("overview");
        assert_eq!(overview.totals.total_organizations, 1);
        assert_eq!(overview.totals.total_applicants, 1);
        assert_eq!(overview.totals.total_applications, 2);

        let report = service.analytics(&admin).expect("analytics");
        assert_eq!(report.applications_trend.last().map(|month| month.month.as_str()), Some("Mar 24"));
        assert_eq!(report.applications_trend.last().map(|month| month.applications), Some(2));
        assert_eq!(report.jobs_by_department[0].department, "Operations");

        let rows = service
            .organization_directory(&admin, QueryCriteria::default())
            .expect("directory")
            .items;
        assert_eq!(rows[0].applications_count, 2);
        let mut directory = OrganizationDirectory::new(rows);
        let org_id = directory.rows()[0].organization.id.clone();
        directory
            .set_status(&service, &admin, &org_id, OrganizationStatus::Suspended)
            .expect("suspended");

        assert!(matches!(
            service.resolve(Some(&org_token)),
            Err(BoardError::Authorization(AuthorizationError::OrganizationInactive(_)))
        ));

        let export = service.export_jobs(&admin).expect("export");
        assert_eq!(export.file_name, "jobs-export-2024-03-20.csv");
        assert!(export.body.contains("Dispatcher,Operations,Abuja,full-time,active,2024-03-20,N/A"));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use job_board::board::board_router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn signup_login_post_and_browse_over_http() {
        let service = build_service();
        let router = board_router(service);

        let signup = router
            .clone()
            .oneshot(
                Request::post("/api/v1/organizations/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "company_name": "Kite Logistics",
                            "contact_person": "Hiring Manager",
                            "email": "jobs@kite.example",
                            "password": PASSWORD,
                            "confirm_password": PASSWORD,
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(signup.status(), StatusCode::CREATED);

        let login = router
            .clone()
            .oneshot(
                Request::post("/api/v1/organizations/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "email": "jobs@kite.example", "password": PASSWORD }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(login.status(), StatusCode::OK);
        let token = json_body(login).await["session"]["access_token"]
            .as_str()
            .expect("token")
            .to_string();

        let posted = router
            .clone()
            .oneshot(
                Request::post("/api/v1/organization/jobs")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "title": "Dispatcher",
                            "department": "Operations",
                            "location": "Abuja",
                            "type": "contract",
                            "description": "Coordinate the fleet.",
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(posted.status(), StatusCode::CREATED);

        let browse = router
            .oneshot(
                Request::get("/api/v1/jobs?type=contract&sort=title-asc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(browse.status(), StatusCode::OK);
        let page = json_body(browse).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["total_pages"], 1);
        assert_eq!(page["items"][0]["title"], "Dispatcher");
        assert_eq!(page["items"][0]["type"], "contract");
    }
}
