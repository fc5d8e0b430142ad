use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, JobDraft, JobId, OrganizationId,
    OrganizationSignup, OrganizationStatus, UserId,
};
use super::error::{AuthorizationError, BoardError};
use super::identity::{Actor, IdentityError, IdentityProvider};
use super::query::{JobSort, QueryCriteria, RecordSort};
use super::repository::{BoardStore, RepositoryError};
use super::service::JobBoardService;
use super::storage::{ResumeStorage, ResumeUpload};

type Shared<S, I, F> = State<Arc<JobBoardService<S, I, F>>>;
type Params = Query<BTreeMap<String, String>>;

/// Router exposing the public board, the organization portal and the admin back office.
pub fn board_router<S, I, F>(service: Arc<JobBoardService<S, I, F>>) -> Router
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let upload_limit = usize::try_from(service.policy().resume.max_bytes().saturating_mul(2))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/v1/jobs", get(public_jobs_handler::<S, I, F>))
        .route("/api/v1/jobs/:job_id", get(public_job_handler::<S, I, F>))
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(submit_application_handler::<S, I, F>),
        )
        .route(
            "/api/v1/applications/track",
            get(track_applications_handler::<S, I, F>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(application_status_handler::<S, I, F>),
        )
        .route("/api/v1/me/applications", get(my_applications_handler::<S, I, F>))
        .route(
            "/api/v1/resumes",
            post(upload_resume_handler::<S, I, F>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/settings", get(settings_handler::<S, I, F>))
        .route("/api/v1/auth/signup", post(applicant_signup_handler::<S, I, F>))
        .route("/api/v1/auth/login", post(sign_in_handler::<S, I, F>))
        .route("/api/v1/auth/logout", post(sign_out_handler::<S, I, F>))
        .route(
            "/api/v1/organizations/signup",
            post(organization_signup_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organizations/login",
            post(organization_login_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organization/jobs",
            get(organization_jobs_handler::<S, I, F>).post(create_job_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organization/jobs/:job_id",
            put(update_job_handler::<S, I, F>).delete(delete_job_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organization/jobs/:job_id/toggle",
            post(toggle_job_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organization/jobs/:job_id/applications",
            get(job_applications_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organization/applications",
            get(organization_applications_handler::<S, I, F>),
        )
        .route(
            "/api/v1/organization/stats",
            get(organization_stats_handler::<S, I, F>),
        )
        .route("/api/v1/admin/overview", get(admin_overview_handler::<S, I, F>))
        .route("/api/v1/admin/analytics", get(analytics_handler::<S, I, F>))
        .route(
            "/api/v1/admin/jobs",
            get(admin_jobs_handler::<S, I, F>).post(create_job_handler::<S, I, F>),
        )
        .route("/api/v1/admin/jobs/export", get(export_jobs_handler::<S, I, F>))
        .route(
            "/api/v1/admin/jobs/:job_id",
            put(update_job_handler::<S, I, F>).delete(delete_job_handler::<S, I, F>),
        )
        .route(
            "/api/v1/admin/jobs/:job_id/toggle",
            post(toggle_job_handler::<S, I, F>),
        )
        .route(
            "/api/v1/admin/jobs/:job_id/applications",
            get(job_applications_handler::<S, I, F>),
        )
        .route(
            "/api/v1/admin/applications",
            get(admin_applications_handler::<S, I, F>),
        )
        .route(
            "/api/v1/admin/organizations",
            get(organization_directory_handler::<S, I, F>),
        )
        .route(
            "/api/v1/admin/organizations/:organization_id/status",
            put(organization_status_handler::<S, I, F>),
        )
        .route("/api/v1/admin/applicants", get(applicants_handler::<S, I, F>))
        .route(
            "/api/v1/admin/applicants/:user_id/applications",
            get(applicant_applications_handler::<S, I, F>),
        )
        .route(
            "/api/v1/admin/settings/:key",
            put(update_setting_handler::<S, I, F>),
        )
        .with_state(service)
}

/// Token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn actor<S, I, F>(
    service: &JobBoardService<S, I, F>,
    headers: &HeaderMap,
) -> Result<Actor, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    service.resolve(bearer_token(headers))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettingChangeRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicantSignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrackQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadQuery {
    #[serde(default)]
    pub file_name: Option<String>,
}

pub(crate) async fn public_jobs_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let criteria = QueryCriteria::<JobSort>::from_params(params)?;
    let page = service.public_jobs(criteria)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn public_job_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let job = service.public_job(&JobId(job_id))?;
    Ok(Json(job).into_response())
}

pub(crate) async fn submit_application_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(submission): Json<ApplicationSubmission>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let application = service.submit_application(&actor, &JobId(job_id), submission)?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

pub(crate) async fn track_applications_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Query(query): Query<TrackQuery>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let applications = service.track_applications(&query.email)?;
    Ok(Json(applications).into_response())
}

pub(crate) async fn my_applications_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let applications = service.my_applications(&actor)?;
    Ok(Json(applications).into_response())
}

pub(crate) async fn application_status_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let status: ApplicationStatus = request.status.parse()?;
    let actor = actor(&service, &headers)?;
    let application =
        service.update_application_status(&actor, &ApplicationId(application_id), status)?;
    Ok(Json(application).into_response())
}

pub(crate) async fn upload_resume_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let upload = ResumeUpload {
        file_name: query.file_name.unwrap_or_else(|| "resume.pdf".to_string()),
        content_type,
        bytes: body.to_vec(),
    };
    let stored = service.upload_resume(upload)?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub(crate) async fn settings_handler<S, I, F>(
    State(service): Shared<S, I, F>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    Ok(Json(service.site_settings()?).into_response())
}

pub(crate) async fn applicant_signup_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Json(request): Json<ApplicantSignupRequest>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let user = service.register_applicant(&request.email, &request.password, &request.full_name)?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

pub(crate) async fn sign_in_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let session = service.sign_in(&request.email, &request.password)?;
    Ok(Json(session).into_response())
}

pub(crate) async fn sign_out_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let token = bearer_token(&headers).ok_or(AuthorizationError::Unauthenticated)?;
    service.sign_out(token)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn organization_signup_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Json(signup): Json<OrganizationSignup>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let organization = service.signup_organization(signup)?;
    Ok((StatusCode::CREATED, Json(organization)).into_response())
}

pub(crate) async fn organization_login_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let session = service.organization_login(&request.email, &request.password)?;
    Ok(Json(session).into_response())
}

pub(crate) async fn organization_jobs_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<JobSort>::from_params(params)?;
    Ok(Json(service.organization_jobs(&actor, criteria)?).into_response())
}

pub(crate) async fn create_job_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let job = service.create_job(&actor, draft)?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

pub(crate) async fn update_job_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let job = service.update_job(&actor, &JobId(job_id), draft)?;
    Ok(Json(job).into_response())
}

pub(crate) async fn toggle_job_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let job = service.toggle_job(&actor, &JobId(job_id))?;
    Ok(Json(job).into_response())
}

pub(crate) async fn delete_job_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    service.delete_job(&actor, &JobId(job_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn job_applications_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<RecordSort>::from_params(params)?;
    let page = service.job_applications(&actor, &JobId(job_id), criteria)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn organization_applications_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<RecordSort>::from_params(params)?;
    Ok(Json(service.organization_applications(&actor, criteria)?).into_response())
}

pub(crate) async fn organization_stats_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    Ok(Json(service.organization_stats(&actor)?).into_response())
}

pub(crate) async fn admin_overview_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    Ok(Json(service.admin_overview(&actor)?).into_response())
}

pub(crate) async fn analytics_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    Ok(Json(service.analytics(&actor)?).into_response())
}

pub(crate) async fn admin_jobs_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<JobSort>::from_params(params)?;
    Ok(Json(service.admin_jobs(&actor, criteria)?).into_response())
}

pub(crate) async fn export_jobs_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let export = service.export_jobs(&actor)?;
    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}

pub(crate) async fn admin_applications_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<RecordSort>::from_params(params)?;
    Ok(Json(service.admin_applications(&actor, criteria)?).into_response())
}

pub(crate) async fn organization_directory_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<RecordSort>::from_params(params)?;
    Ok(Json(service.organization_directory(&actor, criteria)?).into_response())
}

pub(crate) async fn organization_status_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(organization_id): Path<String>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let status: OrganizationStatus = request.status.parse()?;
    let actor = actor(&service, &headers)?;
    let organization =
        service.set_organization_status(&actor, &OrganizationId(organization_id), status)?;
    Ok(Json(organization).into_response())
}

pub(crate) async fn applicants_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let criteria = QueryCriteria::<RecordSort>::from_params(params)?;
    Ok(Json(service.applicants(&actor, criteria)?).into_response())
}

pub(crate) async fn applicant_applications_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let applications = service.applicant_applications(&actor, &UserId(user_id))?;
    Ok(Json(applications).into_response())
}

pub(crate) async fn update_setting_handler<S, I, F>(
    State(service): Shared<S, I, F>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(request): Json<SettingChangeRequest>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
    I: IdentityProvider + 'static,
    F: ResumeStorage + 'static,
{
    let actor = actor(&service, &headers)?;
    let setting = service.update_setting(&actor, &key, request.value)?;
    Ok(Json(setting).into_response())
}

impl BoardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Authorization(AuthorizationError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } | Self::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::Repository(RepositoryError::Conflict(_))
            | Self::Identity(IdentityError::EmailTaken(_)) => StatusCode::CONFLICT,
            Self::Identity(IdentityError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Repository(RepositoryError::Unavailable(_))
            | Self::Identity(IdentityError::Unavailable(_))
            | Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let payload = json!({
            "error": self.to_string(),
        });
        (status, Json(payload)).into_response()
    }
}
