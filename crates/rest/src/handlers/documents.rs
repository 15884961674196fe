//! Collection document handlers.
//!
//! Every handler asks the collection's [`CollectionAccess`] before touching
//! storage:
//!
//! - lists are filtered by the actor's tenants, anonymous visitors see the
//!   published documents of the resolved site tenant;
//! - single reads the caller may not see answer `404`, so existence is not
//!   leaked;
//! - denied writes answer `403`.
//!
//! [`CollectionAccess`]: meridian_tenancy::access::CollectionAccess

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use meridian_tenancy::access::Operation;
use meridian_tenancy::core::Storage;
use meridian_tenancy::error::{TenantError, ValidationError};
use meridian_tenancy::tenant::{Actor, TenantId};
use meridian_tenancy::types::{Collection, Document, DocumentPatch, NewDocument, Page};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::extractors::{Authenticated, ListQuery, MaybeActor, SiteTenant};
use crate::state::AppState;

fn parse_collection(raw: &str) -> RestResult<Collection> {
    raw.parse::<Collection>().map_err(RestError::from)
}

/// Loads a document the caller may read, or fails with 404.
async fn load_readable<S: Storage>(
    state: &AppState<S>,
    collection: Collection,
    id: &str,
    actor: Option<&Actor>,
    site: SiteTenant,
) -> RestResult<Document> {
    let not_found = || RestError::NotFound {
        collection,
        id: id.to_string(),
    };

    let doc = state.storage().get(collection, id).await?.ok_or_else(not_found)?;
    let rules = state.access(collection);
    let readable = match actor {
        Some(actor) => rules.can_access_document(actor, Operation::Read, Some(doc.tenant)),
        None => rules.public_list_access(site.tenant_id()).allows(&doc),
    };

    if readable {
        Ok(doc)
    } else {
        debug!(%collection, id, "Read denied, answering not found");
        Err(not_found())
    }
}

/// Rejects a write the actor may not perform on a tenant's document.
fn ensure_write<S: Storage>(
    state: &AppState<S>,
    actor: &Actor,
    collection: Collection,
    operation: Operation,
    tenant: TenantId,
) -> RestResult<()> {
    if state
        .access(collection)
        .can_access_document(actor, operation, Some(tenant))
    {
        Ok(())
    } else {
        debug!(
            actor = %actor.label(),
            %collection,
            %operation,
            %tenant,
            "Write denied"
        );
        Err(RestError::forbidden("You are not allowed to perform this action."))
    }
}

/// Handler for listing a collection.
///
/// # HTTP Request
///
/// `GET /api/{collection}?limit=&page=`
pub async fn list_handler<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
    MaybeActor(actor): MaybeActor,
    site: SiteTenant,
    Query(query): Query<ListQuery>,
) -> RestResult<Json<Page<Document>>>
where
    S: Storage + 'static,
{
    let collection = parse_collection(&collection)?;
    let rules = state.access(collection);
    let access = match &actor {
        Some(actor) => rules.list_access(actor),
        None => rules.public_list_access(site.tenant_id()),
    };

    debug!(
        %collection,
        actor = actor.as_ref().map(Actor::label).as_deref().unwrap_or("anonymous"),
        denied = access.is_denied(),
        "Listing documents"
    );

    let page = state
        .storage()
        .find(collection, &access, false, query.pagination())
        .await?;
    Ok(Json(page))
}

/// Handler for reading one document.
///
/// # HTTP Request
///
/// `GET /api/{collection}/{id}`
pub async fn read_handler<S>(
    State(state): State<AppState<S>>,
    Path((collection, id)): Path<(String, String)>,
    MaybeActor(actor): MaybeActor,
    site: SiteTenant,
) -> RestResult<Json<Document>>
where
    S: Storage + 'static,
{
    let collection = parse_collection(&collection)?;
    let doc = load_readable(&state, collection, &id, actor.as_ref(), site).await?;
    Ok(Json(doc))
}

/// Handler for creating a document.
///
/// Tenant machines that omit `tenant` get their own tenant; humans must
/// name one.
///
/// # HTTP Request
///
/// `POST /api/{collection}`
pub async fn create_handler<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
    Authenticated(actor): Authenticated,
    Json(body): Json<NewDocument>,
) -> RestResult<(StatusCode, Json<Document>)>
where
    S: Storage + 'static,
{
    let collection = parse_collection(&collection)?;

    let tenant = match (body.tenant, &actor) {
        (Some(tenant), _) => tenant,
        (None, Actor::TenantMachine { tenant }) => *tenant,
        (None, _) => {
            return Err(ValidationError::MissingRequiredField {
                field: "tenant".to_string(),
            }
            .into());
        }
    };

    ensure_write(&state, &actor, collection, Operation::Create, tenant)?;

    if state.storage().tenant(tenant).await?.is_none() {
        return Err(TenantError::UnknownTenant { tenant_id: tenant }.into());
    }

    let mut doc = Document::new(collection, tenant, body.data);
    if let Some(id) = body.id.filter(|id| !id.trim().is_empty()) {
        doc = doc.with_id(id);
    }
    doc.published = body.published;

    let doc = state.storage().create(doc).await?;
    debug!(%collection, id = %doc.id, tenant = %tenant, "Created document");
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Handler for patching a document.
///
/// # HTTP Request
///
/// `PATCH /api/{collection}/{id}`
pub async fn update_handler<S>(
    State(state): State<AppState<S>>,
    Path((collection, id)): Path<(String, String)>,
    Authenticated(actor): Authenticated,
    Json(patch): Json<DocumentPatch>,
) -> RestResult<Json<Document>>
where
    S: Storage + 'static,
{
    let collection = parse_collection(&collection)?;
    let current = load_readable(&state, collection, &id, Some(&actor), SiteTenant::default()).await?;
    ensure_write(&state, &actor, collection, Operation::Update, current.tenant)?;

    let doc = state.storage().update(collection, &id, &patch).await?;
    Ok(Json(doc))
}

/// Handler for deleting a document. Answers with the removed document.
///
/// # HTTP Request
///
/// `DELETE /api/{collection}/{id}`
pub async fn delete_handler<S>(
    State(state): State<AppState<S>>,
    Path((collection, id)): Path<(String, String)>,
    Authenticated(actor): Authenticated,
) -> RestResult<Json<Document>>
where
    S: Storage + 'static,
{
    let collection = parse_collection(&collection)?;
    let current = load_readable(&state, collection, &id, Some(&actor), SiteTenant::default()).await?;
    ensure_write(&state, &actor, collection, Operation::Delete, current.tenant)?;

    state.storage().delete(collection, &id).await?;
    debug!(%collection, id = %id, "Deleted document");
    Ok(Json(current))
}
