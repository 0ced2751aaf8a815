//! User accounts and the staff lifecycle.
//!
//! Every account (admin, staff, customer) lives in one `users` table. Staff
//! accounts additionally carry a status, a role title and permission labels;
//! "deleting" a staff member flips the status to inactive and keeps the row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use careops_core::{DomainError, DomainResult, Patch, Record, UserId};

use crate::permissions::{self, Permission};
use crate::Role;

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MIN_USERNAME_CHARS: usize = 3;
pub const DEFAULT_ROLE_TITLE: &str = "Staff Member";

/// Staff account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
        }
    }
}

/// Persisted user record.
///
/// # Invariants
/// - `email` is unique across all accounts.
/// - `role` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub username: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub status: Option<StaffStatus>,
    #[serde(default)]
    pub role_title: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub joined_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for User {
    const TABLE: &'static str = "users";
    const KIND: &'static str = "user";
}

impl User {
    pub fn is_active_staff(&self) -> bool {
        self.role == Role::Staff && self.status == Some(StaffStatus::Active)
    }
}

/// Self-service sign-up payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Registration {
    pub fn validate(&self) -> DomainResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_username(&self.username)
    }

    /// Build the record to persist. `password_hash` must already be hashed.
    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            email: normalize_email(&self.email),
            password_hash,
            username: self.username.trim().to_string(),
            phone_number: self.phone_number,
            role: self.role,
            status: None,
            role_title: None,
            permissions: Vec::new(),
            joined_date: None,
            last_active: None,
            last_login: None,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Back-office payload for creating a staff account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role_title: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl NewStaff {
    pub fn validate(&self) -> DomainResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_username(&self.username)
    }

    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            email: normalize_email(&self.email),
            password_hash,
            username: self.username.trim().to_string(),
            phone_number: self.phone_number,
            role: Role::Staff,
            status: Some(StaffStatus::Active),
            role_title: Some(
                self.role_title
                    .unwrap_or_else(|| DEFAULT_ROLE_TITLE.to_string()),
            ),
            permissions: permissions::normalize(self.permissions),
            joined_date: Some(now),
            last_active: None,
            last_login: None,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Partial update of a staff account. Role and email are not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        default,
        deserialize_with = "careops_core::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StaffStatus>,
}

impl Patch for StaffPatch {}

/// Written on every successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct LoginStamp {
    pub last_login: DateTime<Utc>,
}

impl Patch for LoginStamp {}

impl StaffPatch {
    /// Soft delete: keep the row, mark it inactive.
    pub fn deactivate() -> Self {
        Self {
            status: Some(StaffStatus::Inactive),
            ..Default::default()
        }
    }

    pub fn normalized(mut self) -> DomainResult<Self> {
        if let Some(username) = &self.username {
            validate_username(username)?;
            self.username = Some(username.trim().to_string());
        }
        self.permissions = self.permissions.map(permissions::normalize);
        Ok(self)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::validation("invalid email format")),
    }
}

fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_username(username: &str) -> DomainResult<()> {
    if username.trim().chars().count() < MIN_USERNAME_CHARS {
        return Err(DomainError::validation(format!(
            "username must be at least {MIN_USERNAME_CHARS} characters"
        )));
    }
    Ok(())
}
