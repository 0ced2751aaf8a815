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

use careops_core::{FormId, Record};
use careops_forms::{Form, FormPatch, FormStatus, NewForm};
use careops_infra::{Query, repository};

use crate::app::dto::{MessageResponse, StatusFilter};
use crate::app::errors::ApiError;
use crate::app::extract::{Params, Payload, parse_id};
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

const KIND: &str = "Form";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_forms).post(create_form))
        .route("/:id", get(get_form).patch(update_form).delete(delete_form))
}

pub async fn create_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewForm>,
) -> Result<Response, ApiError> {
    require_staff_or_admin(&caller)?;

    let form = body.into_form(caller.id(), Utc::now());
    let form = repository::insert(&*services.store, &form).await?;
    info!(form_id = %form.id, fields = form.fields, "form created");
    Ok((StatusCode::CREATED, Json(form)).into_response())
}

pub async fn list_forms(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Params(filter): Params<StatusFilter<FormStatus>>,
) -> Result<Json<Vec<Form>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let mut query = Query::table(Form::TABLE);
    if let Some(status) = filter.status {
        query = query.eq("status", status.as_str());
    }
    let query = query.order_by("created_at", true);
    let forms: Vec<Form> = repository::list(&*services.store, &query).await?;
    Ok(Json(forms))
}

pub async fn get_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Form>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: FormId = parse_id(&id, KIND)?;

    repository::find_by_id::<Form, _>(&*services.store, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(KIND))
}

/// Open to any authenticated caller so customers can fill in their forms.
pub async fn update_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_caller): Extension<CurrentUser>,
    Path(id): Path<String>,
    Payload(patch): Payload<FormPatch>,
) -> Result<Json<Form>, ApiError> {
    let id: FormId = parse_id(&id, KIND)?;

    let existing: Form = repository::find_by_id(&*services.store, id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    let patch = patch.with_derived_progress(&existing)?;

    repository::update_by_id::<Form, _, _>(&*services.store, id, &patch, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(KIND))
}

pub async fn delete_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: FormId = parse_id(&id, KIND)?;

    if !repository::delete_by_id::<Form, _>(&*services.store, id).await? {
        return Err(ApiError::not_found(KIND));
    }
    Ok(Json(MessageResponse::new("Form deleted successfully")))
}
