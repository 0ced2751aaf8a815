//! Request/response shapes that are not domain records themselves.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use careops_auth::{Permission, Role, StaffStatus, User};
use careops_bookings::{Booking, BookingStatus};
use careops_core::UserId;

/// Public profile of an account (never includes the password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            username: u.username.clone(),
            phone_number: u.phone_number.clone(),
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserView,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user: &User) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            user: UserView::from(user),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub role_title: String,
    pub permissions: Vec<Permission>,
    pub status: StaffStatus,
    pub joined_date: Option<DateTime<Utc>>,
    pub last_active: Option<DateTime<Utc>>,
}

impl From<User> for StaffView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            phone_number: u.phone_number,
            role: u.role,
            role_title: u.role_title.unwrap_or_default(),
            permissions: u.permissions,
            status: u.status.unwrap_or_default(),
            joined_date: u.joined_date.or(Some(u.created_at)),
            last_active: u.last_active,
        }
    }
}

/// A booking with its assigned staff member's name joined in.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub assigned_staff_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusFilter<S> {
    #[serde(alias = "status_filter")]
    pub status: Option<S>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    #[serde(default)]
    pub low_stock_only: bool,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffFilter {
    #[serde(default = "yes")]
    pub active_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertList<T> {
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for AlertList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}
