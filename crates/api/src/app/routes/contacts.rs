use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tracing::info;

use careops_contacts::{Contact, ContactPatch, ContactStatus, NewContact};
use careops_core::{ContactId, Record};
use careops_infra::{Query, repository};

use crate::app::dto::{MessageResponse, StatusFilter};
use crate::app::errors::ApiError;
use crate::app::extract::{Params, Payload, parse_id};
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

const KIND: &str = "Contact";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_contacts).post(create_contact))
        .route(
            "/:id",
            get(get_contact).patch(update_contact).delete(delete_contact),
        )
}

pub async fn create_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewContact>,
) -> Result<Response, ApiError> {
    require_staff_or_admin(&caller)?;

    let contact = repository::insert(&*services.store, &body.into_contact(Utc::now())).await?;
    info!(contact_id = %contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)).into_response())
}

pub async fn list_contacts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Params(filter): Params<StatusFilter<ContactStatus>>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let mut query = Query::table(Contact::TABLE);
    if let Some(status) = filter.status {
        query = query.eq("status", status.as_str());
    }
    let query = query.order_by("created_at", true);
    let contacts: Vec<Contact> = repository::list(&*services.store, &query).await?;
    Ok(Json(contacts))
}

pub async fn get_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: ContactId = parse_id(&id, KIND)?;

    repository::find_by_id::<Contact, _>(&*services.store, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(KIND))
}

pub async fn update_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
    Payload(patch): Payload<ContactPatch>,
) -> Result<Json<Contact>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: ContactId = parse_id(&id, KIND)?;

    repository::update_by_id::<Contact, _, _>(&*services.store, id, &patch, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(KIND))
}

pub async fn delete_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: ContactId = parse_id(&id, KIND)?;

    if !repository::delete_by_id::<Contact, _>(&*services.store, id).await? {
        return Err(ApiError::not_found(KIND));
    }
    Ok(Json(MessageResponse::new("Contact deleted successfully")))
}
