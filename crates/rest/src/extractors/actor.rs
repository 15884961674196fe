//! Actor extractors.
//!
//! Two credential forms are accepted in `Authorization`:
//!
//! - `Bearer <session token>` for human users. The user is reloaded from
//!   storage so membership changes apply immediately.
//! - `tenants API-Key <key>` for tenant machines. The request must also
//!   carry a valid signature (see `meridian_signature`).

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use meridian_tenancy::core::Storage;
use meridian_tenancy::tenant::Actor;
use tracing::{debug, warn};

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Scheme prefix of tenant API key credentials.
pub const API_KEY_SCHEME: &str = "tenants API-Key";

/// Parsed `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// A session token.
    Bearer(&'a str),
    /// A tenant API key.
    ApiKey(&'a str),
}

impl<'a> Credentials<'a> {
    /// Parses an `Authorization` value. Scheme names match case-insensitively.
    pub fn parse(value: &'a str) -> Option<Self> {
        let value = value.trim();
        if let Some(token) = strip_prefix_ignore_case(value, "Bearer ") {
            let token = token.trim();
            return (!token.is_empty()).then_some(Credentials::Bearer(token));
        }
        if let Some(rest) = strip_prefix_ignore_case(value, API_KEY_SCHEME) {
            let key = rest.trim();
            if rest.starts_with(' ') && !key.is_empty() {
                return Some(Credentials::ApiKey(key));
            }
        }
        None
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

/// Authenticates a request. `Ok(None)` means no credentials were sent.
pub async fn authenticate<S: Storage>(parts: &Parts, state: &AppState<S>) -> RestResult<Option<Actor>> {
    let Some(raw) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = raw
        .to_str()
        .map_err(|_| RestError::unauthorized("Malformed Authorization header."))?;

    match Credentials::parse(raw) {
        Some(Credentials::Bearer(token)) => {
            let claims = state.sessions().validate(token)?;
            let user = state
                .storage()
                .user(&claims.sub)
                .await?
                .ok_or_else(|| RestError::unauthorized("Invalid or expired session."))?;
            debug!(user = %user.id, "Authenticated session");
            Ok(Some(Actor::from_user(user)))
        }
        Some(Credentials::ApiKey(key)) => {
            state.verifier().verify(&parts.headers)?;
            let tenant = state.storage().tenant_by_api_key(key).await?.ok_or_else(|| {
                warn!("Signed request with unknown API key");
                RestError::unauthorized("Invalid API key.")
            })?;
            debug!(tenant = %tenant.id, "Authenticated tenant machine");
            Ok(Some(Actor::machine(tenant.id)))
        }
        None => Err(RestError::unauthorized("Unsupported authorization scheme.")),
    }
}

/// Axum extractor requiring an authenticated actor.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Actor);

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
    S: Storage + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .await?
            .map(Authenticated)
            .ok_or_else(|| RestError::unauthorized("You are not allowed to perform this action."))
    }
}

/// Axum extractor for an optional actor. Anonymous requests yield `None`;
/// invalid credentials are still rejected.
#[derive(Debug, Clone)]
pub struct MaybeActor(pub Option<Actor>);

impl<S> FromRequestParts<AppState<S>> for MaybeActor
where
    S: Storage + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(MaybeActor)
    }
}
