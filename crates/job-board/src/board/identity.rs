use serde::{Deserialize, Serialize};

use super::domain::{AdminUser, Job, Organization, OrganizationId, UserId};
use super::error::{AuthorizationError, BoardError};
use super::repository::BoardStore;

/// Identity issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Profile metadata attached to a new account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpProfile {
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}

/// Third-party authentication capability. Roles are never decided here; see [`resolve_actor`].
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self, token: &str) -> Result<Option<AuthUser>, IdentityError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: SignUpProfile,
    ) -> Result<AuthUser, IdentityError>;
    fn sign_out(&self, token: &str) -> Result<(), IdentityError>;
    /// Removes an account and its sessions. Used to roll back a signup whose profile row
    /// could not be stored.
    fn delete_user(&self, id: &UserId) -> Result<(), IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account already exists for {0}")]
    EmailTaken(String),
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolved caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Applicant(AuthUser),
    Organization(Organization),
    Admin(AdminUser),
}

impl Actor {
    pub fn role(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Applicant(_) => "applicant",
            Self::Organization(_) => "organization",
            Self::Admin(_) => "admin",
        }
    }

    /// Identity id attached to submissions, when the caller is signed in.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Applicant(user) => Some(user.id.clone()),
            Self::Organization(organization) => Some(UserId(organization.id.0.clone())),
            Self::Admin(admin) => Some(admin.id.clone()),
        }
    }

    pub fn require_signed_in(&self) -> Result<UserId, AuthorizationError> {
        self.user_id().ok_or(AuthorizationError::Unauthenticated)
    }

    pub fn require_admin(&self) -> Result<&AdminUser, AuthorizationError> {
        match self {
            Self::Admin(admin) => Ok(admin),
            Self::Anonymous => Err(AuthorizationError::Unauthenticated),
            _ => Err(AuthorizationError::Forbidden("admin access required")),
        }
    }

    pub fn require_organization(&self) -> Result<&Organization, AuthorizationError> {
        match self {
            Self::Organization(organization) => Ok(organization),
            Self::Anonymous => Err(AuthorizationError::Unauthenticated),
            _ => Err(AuthorizationError::Forbidden("organization access required")),
        }
    }

    /// Admins manage every job; organizations only their own.
    pub fn authorize_job(&self, job: &Job) -> Result<(), AuthorizationError> {
        match self {
            Self::Admin(_) => Ok(()),
            Self::Organization(organization)
                if job.organization_id.as_ref() == Some(&organization.id) =>
            {
                Ok(())
            }
            Self::Organization(_) => Err(AuthorizationError::Forbidden(
                "job belongs to another organization",
            )),
            Self::Anonymous => Err(AuthorizationError::Unauthenticated),
            Self::Applicant(_) => Err(AuthorizationError::Forbidden(
                "applicants cannot manage jobs",
            )),
        }
    }
}

/// Only active organizations may use the portal.
pub fn ensure_portal_access(organization: &Organization) -> Result<(), AuthorizationError> {
    if organization.status.permits_portal_access() {
        Ok(())
    } else {
        Err(AuthorizationError::OrganizationInactive(organization.status))
    }
}

/// Maps a bearer token to an [`Actor`] by membership lookup against the admin and organization
/// tables. A missing or unknown token resolves to [`Actor::Anonymous`].
pub fn resolve_actor<S, I>(
    store: &S,
    identity: &I,
    token: Option<&str>,
) -> Result<Actor, BoardError>
where
    S: BoardStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    let Some(token) = token.map(str::trim).filter(|token| !token.is_empty()) else {
        return Ok(Actor::Anonymous);
    };
    let Some(user) = identity.current_user(token)? else {
        return Ok(Actor::Anonymous);
    };

    if let Some(admin) = store.fetch_admin(&user.id)? {
        return Ok(Actor::Admin(admin));
    }

    if let Some(organization) = store.fetch_organization(&OrganizationId::from(&user.id))? {
        ensure_portal_access(&organization)?;
        return Ok(Actor::Organization(organization));
    }

    Ok(Actor::Applicant(user))
}
