use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tower::ServiceExt;

use crate::board::domain::ApplicationStatus;
use crate::board::identity::Actor;
use crate::board::memory::{MemoryIdentityProvider, MemoryResumeStorage, MemoryStore};
use crate::board::router::{
    bearer_token, board_router, public_job_handler, public_jobs_handler, StatusChangeRequest,
};

fn router(board: &Board) -> Router {
    board_router(board.service.clone())
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn submission_payload(email: &str) -> Value {
    json!({
        "full_name": "Ada Lovelace",
        "email": email,
        "phone": "+44 20 7946 0000",
        "cover_letter": "Numbers are my thing.",
        "resume_url": "https://files.example.com/resumes/ada.pdf",
    })
}

#[tokio::test]
async fn public_jobs_handler_returns_a_page() {
    let board = seeded_board();

    let response = public_jobs_handler::<MemoryStore, MemoryIdentityProvider, MemoryResumeStorage>(
        State(board.service.clone()),
        Query(BTreeMap::from([("q".to_string(), "finance".to_string())])),
    )
    .await
    .expect("handler succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], 1);
    assert_eq!(payload["page"], 1);
    assert_eq!(payload["page_size"], 9);
    assert_eq!(payload["items"][0]["title"], "Finance Analyst");
}

#[tokio::test]
async fn public_job_handler_hides_inactive_jobs() {
    let board = seeded_board();

    let result = public_job_handler::<MemoryStore, MemoryIdentityProvider, MemoryResumeStorage>(
        State(board.service.clone()),
        Path(board.inactive_job.0.clone()),
    )
    .await;

    let error = result.expect_err("inactive job is hidden");
    assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_sort_key_is_unprocessable() {
    let board = seeded_board();

    let response = router(&board)
        .oneshot(request("GET", "/api/v1/jobs?sort=salary-desc", None, None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("salary-desc")));
}

#[tokio::test]
async fn zero_page_size_is_unprocessable() {
    let board = seeded_board();

    let response = router(&board)
        .oneshot(request("GET", "/api/v1/jobs?page_size=0", None, None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn submit_route_creates_applications() {
    let board = seeded_board();
    let uri = format!("/api/v1/jobs/{}/applications", board.org_job);

    let response = router(&board)
        .oneshot(request(
            "POST",
            &uri,
            None,
            Some(submission_payload("ada@example.com")),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "pending");
    assert_eq!(payload["job_id"], board.org_job.as_str());
    assert!(payload["user_id"].is_null());
}

#[tokio::test]
async fn submit_route_rejects_inactive_jobs_and_bad_input() {
    let board = seeded_board();

    let inactive = router(&board)
        .oneshot(request(
            "POST",
            &format!("/api/v1/jobs/{}/applications", board.inactive_job),
            None,
            Some(submission_payload("ada@example.com")),
        ))
        .await
        .expect("route executes");
    assert_eq!(inactive.status(), StatusCode::NOT_FOUND);

    let invalid = router(&board)
        .oneshot(request(
            "POST",
            &format!("/api/v1/jobs/{}/applications", board.org_job),
            None,
            Some(submission_payload("ada-at-example")),
        ))
        .await
        .expect("route executes");
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn track_route_returns_applications_with_jobs() {
    let board = seeded_board();
    board
        .service
        .submit_application(
            &Actor::Anonymous,
            &board.org_job,
            submission("Ada Lovelace", "ada@example.com"),
        )
        .expect("submitted");

    let response = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/applications/track?email=ada@example.com",
            None,
            None,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["job"]["title"], "Finance Analyst");
}

#[tokio::test]
async fn portal_routes_require_a_token() {
    let board = seeded_board();

    let anonymous = router(&board)
        .oneshot(request("GET", "/api/v1/organization/jobs", None, None))
        .await
        .expect("route executes");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let applicant = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/organization/jobs",
            Some(&board.applicant_token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(applicant.status(), StatusCode::FORBIDDEN);

    let organization = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/organization/jobs",
            Some(&board.org_token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(organization.status(), StatusCode::OK);
    let payload = read_json_body(organization).await;
    assert_eq!(payload["total"], 2);
    assert!(payload["items"][0].get("applications_count").is_some());
}

#[tokio::test]
async fn other_organizations_cannot_toggle_jobs() {
    let board = seeded_board();
    let uri = format!("/api/v1/organization/jobs/{}/toggle", board.org_job);

    let intruder = router(&board)
        .oneshot(request("POST", &uri, Some(&board.other_org_token), None))
        .await
        .expect("route executes");
    assert_eq!(intruder.status(), StatusCode::FORBIDDEN);

    let owner = router(&board)
        .oneshot(request("POST", &uri, Some(&board.org_token), None))
        .await
        .expect("route executes");
    assert_eq!(owner.status(), StatusCode::OK);
    let payload = read_json_body(owner).await;
    assert_eq!(payload["status"], "inactive");
}

#[tokio::test]
async fn status_route_validates_the_target_state() {
    let board = seeded_board();
    let application = board
        .service
        .submit_application(
            &Actor::Anonymous,
            &board.org_job,
            submission("Ada Lovelace", "ada@example.com"),
        )
        .expect("submitted");
    let uri = format!("/api/v1/applications/{}/status", application.id);

    let unknown = router(&board)
        .oneshot(request(
            "PUT",
            &uri,
            Some(&board.org_token),
            Some(json!({ "status": "archived" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let shortlisted = router(&board)
        .oneshot(request(
            "PUT",
            &uri,
            Some(&board.org_token),
            Some(json!({ "status": "shortlisted" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(shortlisted.status(), StatusCode::OK);

    let stored = board
        .service
        .track_applications("ada@example.com")
        .expect("tracked");
    assert_eq!(stored[0].application.status, ApplicationStatus::Shortlisted);
}

#[tokio::test]
async fn organization_signup_conflicts_on_duplicate_email() {
    let board = seeded_board();
    let payload = json!({
        "company_name": "Northwind Again",
        "contact_person": "Grace Hopper",
        "email": ORG_EMAIL,
        "password": PASSWORD,
        "confirm_password": PASSWORD,
    });

    let response = router(&board)
        .oneshot(request(
            "POST",
            "/api/v1/organizations/signup",
            None,
            Some(payload),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_routes_issue_and_revoke_sessions() {
    let board = seeded_board();

    let wrong = router(&board)
        .oneshot(request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": APPLICANT_EMAIL, "password": "nope" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let login = router(&board)
        .oneshot(request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": APPLICANT_EMAIL, "password": PASSWORD })),
        ))
        .await
        .expect("route executes");
    assert_eq!(login.status(), StatusCode::OK);
    let session = read_json_body(login).await;
    let token = session["access_token"]
        .as_str()
        .expect("token issued")
        .to_string();

    let mine = router(&board)
        .oneshot(request("GET", "/api/v1/me/applications", Some(&token), None))
        .await
        .expect("route executes");
    assert_eq!(mine.status(), StatusCode::OK);

    let logout = router(&board)
        .oneshot(request("POST", "/api/v1/auth/logout", Some(&token), None))
        .await
        .expect("route executes");
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let after = router(&board)
        .oneshot(request("GET", "/api/v1/me/applications", Some(&token), None))
        .await
        .expect("route executes");
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn organization_login_returns_the_profile() {
    let board = seeded_board();

    let response = router(&board)
        .oneshot(request(
            "POST",
            "/api/v1/organizations/login",
            None,
            Some(json!({ "email": ORG_EMAIL, "password": PASSWORD })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["organization"]["company_name"], "Northwind Traders");
    assert!(payload["session"]["access_token"].is_string());
}

#[tokio::test]
async fn admin_routes_are_admin_only() {
    let board = seeded_board();

    let forbidden = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/admin/overview",
            Some(&board.org_token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let overview = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/admin/overview",
            Some(&board.admin_token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(overview.status(), StatusCode::OK);
    let payload = read_json_body(overview).await;
    assert_eq!(payload["totals"]["total_jobs"], 3);
    assert_eq!(payload["totals"]["active_jobs"], 2);

    let analytics = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/admin/analytics",
            Some(&board.admin_token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(analytics.status(), StatusCode::OK);
    let payload = read_json_body(analytics).await;
    assert_eq!(payload["applications_trend"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn admin_can_suspend_organizations() {
    let board = seeded_board();
    let uri = format!("/api/v1/admin/organizations/{}/status", board.org_id);

    let response = router(&board)
        .oneshot(request(
            "PUT",
            &uri,
            Some(&board.admin_token),
            Some(json!({ "status": "suspended" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let locked_out = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/organization/stats",
            Some(&board.org_token),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(locked_out.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn export_route_serves_csv_attachment() {
    let board = seeded_board();

    let response = router(&board)
        .oneshot(request(
            "GET",
            "/api/v1/admin/jobs/export",
            Some(&board.admin_token),
            None,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION),
        Some(&HeaderValue::from_static(
            "attachment; filename=\"jobs-export-2024-06-15.csv\""
        ))
    );
    let body = read_text_body(response).await;
    assert!(body.starts_with("Title,Department,Location,Type,Status,Posted Date,Deadline"));
    assert_eq!(body.lines().count(), 4);
}

#[tokio::test]
async fn resume_route_checks_content_type() {
    let board = seeded_board();

    let rejected = router(&board)
        .oneshot(
            Request::post("/api/v1/resumes?file_name=cv.docx")
                .header(header::CONTENT_TYPE, "application/msword")
                .body(Body::from(vec![1_u8; 64]))
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let accepted = router(&board)
        .oneshot(
            Request::post("/api/v1/resumes?file_name=cv.pdf")
                .header(header::CONTENT_TYPE, "application/pdf")
                .body(Body::from(b"%PDF-1.7".to_vec()))
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(accepted.status(), StatusCode::CREATED);
    let payload = read_json_body(accepted).await;
    assert_eq!(payload["size"], 8);
}

#[tokio::test]
async fn settings_update_returns_not_found_for_unknown_keys() {
    let board = seeded_board();

    let response = router(&board)
        .oneshot(request(
            "PUT",
            "/api/v1/admin/settings/footer_text",
            Some(&board.admin_token),
            Some(json!({ "value": "hello" })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn bearer_token_requires_the_scheme() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
    assert_eq!(bearer_token(&headers), Some("abc123"));
}

#[test]
fn status_change_request_parses_from_json() {
    let request: StatusChangeRequest =
        serde_json::from_value(json!({ "status": "rejected" })).expect("payload parses");
    assert_eq!(request.status.parse::<ApplicationStatus>().ok(), Some(ApplicationStatus::Rejected));
}
