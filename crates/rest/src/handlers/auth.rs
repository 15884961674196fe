//! Login and current-user handlers.

use axum::{Json, extract::State};
use meridian_tenancy::core::Storage;
use meridian_tenancy::tenant::{Actor, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RestError, RestResult};
use crate::extractors::{Authenticated, RequestHost};
use crate::session::{reject_unknown_account, verify_password};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Human-readable status.
    pub message: &'static str,
    /// Session token for `Authorization: Bearer`.
    pub token: String,
    /// The logged-in user.
    pub user: User,
}

/// Response of `GET /api/users/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// The authenticated actor.
    pub user: Actor,
}

const BAD_CREDENTIALS: &str = "The email or password provided is incorrect.";

/// Handler for logging in.
///
/// Verifies the password, then applies the domain login restriction
/// against the request host.
///
/// # HTTP Request
///
/// `POST /api/users/login`
///
/// # Response
///
/// - `200 OK` - token and user
/// - `401 Unauthorized` - bad credentials
/// - `403 Forbidden` - login not permitted from this host
pub async fn login_handler<S>(
    State(state): State<AppState<S>>,
    RequestHost(host): RequestHost,
    Json(body): Json<LoginRequest>,
) -> RestResult<Json<LoginResponse>>
where
    S: Storage + 'static,
{
    let record = state.storage().user_by_email(body.email.trim()).await?;

    // Unknown emails pay for a bcrypt check too
    let hash = record.as_ref().map(|r| r.password_hash.clone());
    let password = body.password;
    let valid = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => reject_unknown_account(&password),
    })
    .await
    .map_err(|e| RestError::InternalError {
        message: format!("password verification task failed: {}", e),
    })?;

    let record = match record {
        Some(record) if valid => record,
        Some(record) => {
            warn!(email = %record.user.email, "Rejected login with wrong password");
            return Err(RestError::unauthorized(BAD_CREDENTIALS));
        }
        None => {
            debug!("Rejected login for unknown email");
            return Err(RestError::unauthorized(BAD_CREDENTIALS));
        }
    };

    let user = record.user;
    let tenants = state.storage().tenants_by_ids(&user.tenant_ids()).await?;
    let actor = Actor::from_user(user.clone());
    state.domain_policy().check_login(&actor, &host, &tenants)?;

    let token = state.sessions().issue(&user.id, &user.email)?;
    info!(user = %user.id, host = %host, "User logged in");

    Ok(Json(LoginResponse {
        message: "Authentication Passed",
        token,
        user,
    }))
}

/// Handler returning the authenticated actor.
///
/// # HTTP Request
///
/// `GET /api/users/me`
pub async fn me_handler(Authenticated(actor): Authenticated) -> Json<MeResponse> {
    Json(MeResponse { user: actor })
}
