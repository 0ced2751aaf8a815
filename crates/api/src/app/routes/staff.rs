//! Staff accounts live in the users table; every query here is scoped to
//! `role = staff` and runs against the elevated store handle.

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

use careops_auth::{NewStaff, Role, StaffPatch, StaffStatus, User, user::normalize_email};
use careops_core::{Record, UserId};
use careops_infra::{Query, Store, StoreError, repository};

use crate::app::dto::{MessageResponse, StaffFilter, StaffView};
use crate::app::errors::ApiError;
use crate::app::extract::{Params, Payload, parse_id};
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

const KIND: &str = "Staff member";
const EMAIL_TAKEN: &str = "Email already exists";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/:id", get(get_staff).patch(update_staff).delete(delete_staff))
}

fn staff() -> Query {
    Query::table(User::TABLE).eq("role", Role::Staff.as_str())
}

async fn find_staff(store: &dyn Store, id: UserId) -> Result<User, ApiError> {
    repository::find_one(store, &staff().eq("id", id))
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))
}

pub async fn create_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewStaff>,
) -> Result<Response, ApiError> {
    require_staff_or_admin(&caller)?;
    body.validate()?;

    let store = &*services.admin_store;
    let email = normalize_email(&body.email);
    let existing: Option<User> =
        repository::find_one(store, &Query::table(User::TABLE).eq("email", email)).await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let hash = services.hasher.hash(&body.password)?;
    let user = repository::insert(store, &body.into_user(hash, Utc::now()))
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict(EMAIL_TAKEN.to_string()),
            other => ApiError::from(other),
        })?;
    info!(staff_id = %user.id, created_by = %caller.id(), "staff member created");

    Ok((StatusCode::CREATED, Json(StaffView::from(user))).into_response())
}

pub async fn list_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Params(filter): Params<StaffFilter>,
) -> Result<Json<Vec<StaffView>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let mut query = staff();
    if filter.active_only {
        query = query.eq("status", StaffStatus::Active.as_str());
    }
    let users: Vec<User> =
        repository::list(&*services.admin_store, &query.order_by("username", false)).await?;
    Ok(Json(users.into_iter().map(StaffView::from).collect()))
}

pub async fn get_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<StaffView>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: UserId = parse_id(&id, KIND)?;

    let user = find_staff(&*services.admin_store, id).await?;
    Ok(Json(StaffView::from(user)))
}

pub async fn update_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
    Payload(patch): Payload<StaffPatch>,
) -> Result<Json<StaffView>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: UserId = parse_id(&id, KIND)?;
    let patch = patch.normalized()?;

    let store = &*services.admin_store;
    find_staff(store, id).await?;
    let updated: User = repository::update_by_id(store, id, &patch, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    Ok(Json(StaffView::from(updated)))
}

/// Soft delete: the account is marked inactive and stays retrievable.
pub async fn delete_staff(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: UserId = parse_id(&id, KIND)?;

    let store = &*services.admin_store;
    find_staff(store, id).await?;
    let deactivated: Option<User> =
        repository::update_by_id(store, id, &StaffPatch::deactivate(), Utc::now()).await?;
    if deactivated.is_none() {
        return Err(ApiError::not_found(KIND));
    }
    info!(staff_id = %id, deactivated_by = %caller.id(), "staff member deactivated");
    Ok(Json(MessageResponse::new("Staff member deactivated successfully")))
}
