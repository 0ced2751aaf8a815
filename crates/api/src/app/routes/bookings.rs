use std::collections::HashMap;
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

use careops_auth::User;
use careops_bookings::{Booking, BookingPatch, NewBooking, StatusSummary};
use careops_core::{BookingId, Record, UserId};
use careops_infra::{Query, Store, repository};

use crate::app::dto::{BookingFilter, BookingView, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::extract::{Params, Payload, parse_id};
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

const KIND: &str = "Booking";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/stats/summary", get(status_summary))
        .route(
            "/:id",
            get(get_booking).patch(update_booking).delete(delete_booking),
        )
}

/// Attach the assigned staff member's username to each booking.
async fn with_staff_names(
    store: &dyn Store,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingView>, ApiError> {
    let mut ids: Vec<UserId> = bookings.iter().filter_map(|b| b.assigned_staff_id).collect();
    ids.sort();
    ids.dedup();

    let names: HashMap<UserId, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        let users: Vec<User> =
            repository::list(store, &Query::table(User::TABLE).in_("id", ids)).await?;
        users.into_iter().map(|u| (u.id, u.username)).collect()
    };

    Ok(bookings
        .into_iter()
        .map(|booking| {
            let assigned_staff_name = booking
                .assigned_staff_id
                .and_then(|id| names.get(&id).cloned());
            BookingView {
                booking,
                assigned_staff_name,
            }
        })
        .collect())
}

pub async fn create_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewBooking>,
) -> Result<Response, ApiError> {
    let booking = body.into_booking(caller.id(), Utc::now());
    let booking = repository::insert(&*services.store, &booking).await?;
    info!(booking_id = %booking.id, created_by = %caller.id(), "booking created");

    Ok((StatusCode::CREATED, Json(booking)).into_response())
}

pub async fn list_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_caller): Extension<CurrentUser>,
    Params(filter): Params<BookingFilter>,
) -> Result<Json<Vec<BookingView>>, ApiError> {
    let mut query = Query::table(Booking::TABLE);
    if let Some(status) = filter.status {
        query = query.eq("status", status.as_str());
    }
    if let Some(from) = filter.from {
        query = query.gte("date", from.to_string());
    }
    if let Some(to) = filter.to {
        query = query.lte("date", to.to_string());
    }
    let query = query.order_by("date", true).order_by("time", true);

    let bookings: Vec<Booking> = repository::list(&*services.store, &query).await?;
    Ok(Json(with_staff_names(&*services.store, bookings).await?))
}

pub async fn get_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<BookingView>, ApiError> {
    let id: BookingId = parse_id(&id, KIND)?;
    let booking: Booking = repository::find_by_id(&*services.store, id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    let mut views = with_staff_names(&*services.store, vec![booking]).await?;
    views.pop().map(Json).ok_or_else(|| ApiError::not_found(KIND))
}

pub async fn update_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
    Payload(patch): Payload<BookingPatch>,
) -> Result<Json<Booking>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: BookingId = parse_id(&id, KIND)?;

    let updated: Booking = repository::update_by_id(&*services.store, id, &patch, Utc::now())
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    Ok(Json(updated))
}

pub async fn delete_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_staff_or_admin(&caller)?;
    let id: BookingId = parse_id(&id, KIND)?;

    if !repository::delete_by_id::<Booking, _>(&*services.store, id).await? {
        return Err(ApiError::not_found(KIND));
    }
    info!(booking_id = %id, "booking deleted");
    Ok(Json(MessageResponse::new("Booking deleted successfully")))
}

pub async fn status_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<StatusSummary>, ApiError> {
    require_staff_or_admin(&caller)?;

    let bookings: Vec<Booking> =
        repository::list(&*services.store, &Query::table(Booking::TABLE)).await?;
    Ok(Json(bookings.into_iter().map(|b| b.status).collect()))
}
