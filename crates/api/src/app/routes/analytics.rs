use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, Router, extract::Extension, routing::get};
use chrono::Local;

use careops_analytics::{DashboardCounts, DashboardStats, RevenueStats, count_by};
use careops_auth::{Role, StaffStatus, User};
use careops_bookings::{Booking, BookingStatus};
use careops_contacts::Contact;
use careops_core::Record;
use careops_forms::{Form, FormStatus};
use careops_infra::{Query, Store, repository};
use careops_inventory::{InventoryItem, InventoryStatus};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/revenue", get(revenue))
        .route("/bookings/by-status", get(bookings_by_status))
        .route("/bookings/by-service", get(bookings_by_service))
}

async fn count(store: &dyn Store, query: Query) -> Result<usize, ApiError> {
    Ok(store.select(&query).await?.len())
}

fn bookings_with(status: BookingStatus) -> Query {
    Query::table(Booking::TABLE).eq("status", status.as_str())
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<DashboardStats>, ApiError> {
    require_staff_or_admin(&caller)?;
    let store = &*services.store;

    let counts = DashboardCounts {
        total_bookings: count(store, Query::table(Booking::TABLE)).await?,
        pending_bookings: count(store, bookings_with(BookingStatus::Pending)).await?,
        completed_bookings: count(store, bookings_with(BookingStatus::Completed)).await?,
        total_contacts: count(store, Query::table(Contact::TABLE)).await?,
        active_staff: count(
            store,
            Query::table(User::TABLE)
                .eq("role", Role::Staff.as_str())
                .eq("status", StaffStatus::Active.as_str()),
        )
        .await?,
        low_stock_items: count(
            store,
            Query::table(InventoryItem::TABLE)
                .in_("status", InventoryStatus::ALERTING.map(|s| s.as_str())),
        )
        .await?,
        overdue_forms: count(
            store,
            Query::table(Form::TABLE).eq("status", FormStatus::Overdue.as_str()),
        )
        .await?,
    };

    Ok(Json(DashboardStats::from(counts)))
}

pub async fn revenue(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<RevenueStats>, ApiError> {
    require_staff_or_admin(&caller)?;

    let completed: Vec<Booking> =
        repository::list(&*services.store, &bookings_with(BookingStatus::Completed)).await?;
    Ok(Json(RevenueStats::at(
        completed.iter().map(|b| b.created_at),
        &Local::now(),
    )))
}

pub async fn bookings_by_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<BTreeMap<&'static str, usize>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let bookings: Vec<Booking> =
        repository::list(&*services.store, &Query::table(Booking::TABLE)).await?;
    Ok(Json(count_by(bookings.iter().map(|b| b.status.as_str()))))
}

pub async fn bookings_by_service(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<BTreeMap<String, usize>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let bookings: Vec<Booking> =
        repository::list(&*services.store, &Query::table(Booking::TABLE)).await?;
    Ok(Json(count_by(bookings.into_iter().map(|b| b.service))))
}
