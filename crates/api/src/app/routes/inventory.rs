use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tracing::{info, warn};

use careops_core::{InventoryItemId, Record};
use careops_infra::{Query, repository};
use careops_inventory::{InventoryItem, InventoryPatch, InventoryStatus, NewInventoryItem};

use crate::app::dto::{AlertList, InventoryFilter, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::extract::{Params, Payload, parse_id};
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

const KIND: &str = "Item";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/alerts", get(stock_alerts))
        .route("/:id", get(get_item).patch(update_item).delete(delete_item))
}

fn alerting() -> Query {
    Query::table(InventoryItem::TABLE).in_(
        "status",
        InventoryStatus::ALERTING.map(|s| s.as_str()),
    )
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewInventoryItem>,
) -> Result<Response, ApiError> {
    require_staff_or_admin(&caller)?;

    let item = repository::insert(&*services.store, &body.into_item(Utc::now())).await?;
    info!(item_id = %item.id, status = item.status.as_str(), "inventory item created");
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Params(filter): Params<InventoryFilter>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let query = if filter.low_stock_only {
        alerting()
    } else {
        Query::table(InventoryItem::TABLE)
    };
    let query = query.order_by("name", false);
    let items: Vec<InventoryItem> = repository::list(&*services.store, &query).await?;
    Ok(Json(items))
}

pub async fn stock_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<AlertList<InventoryItem>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let items: Vec<InventoryItem> =
        repository::list(&*services.store, &alerting().order_by("name", false)).await?;
    Ok(Json(AlertList::from(items)))
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<InventoryItem>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: InventoryItemId = parse_id(&id, KIND)?;

    repository::find_by_id::<InventoryItem, _>(&*services.store, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(KIND))
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
    Payload(patch): Payload<InventoryPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: InventoryItemId = parse_id(&id, KIND)?;

    // Read-then-write; concurrent stock edits may derive from stale levels.
    let existing: InventoryItem = repository::find_by_id(&*services.store, id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    let patch = patch.with_derived_status(&existing);

    let updated: InventoryItem = repository::update_by_id(&*services.store, id, &patch, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    if updated.status != existing.status {
        warn!(
            item_id = %updated.id,
            from = existing.status.as_str(),
            to = updated.status.as_str(),
            "inventory status changed"
        );
    }
    Ok(Json(updated))
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: InventoryItemId = parse_id(&id, KIND)?;

    if !repository::delete_by_id::<InventoryItem, _>(&*services.store, id).await? {
        return Err(ApiError::not_found(KIND));
    }
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}
