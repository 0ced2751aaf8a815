use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, info};

use careops_auth::{LoginStamp, Registration, User, user::normalize_email};
use careops_core::Record;
use careops_infra::{Query, StoreError, repository};

use crate::app::dto::{LoginRequest, MessageResponse, TokenResponse, UserView};
use crate::app::errors::ApiError;
use crate::app::extract::Payload;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

const EMAIL_TAKEN: &str = "Email already registered";
const BAD_LOGIN: &str = "incorrect email or password";

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<Registration>,
) -> Result<Response, ApiError> {
    body.validate()?;

    let email = normalize_email(&body.email);
    let query = Query::table(User::TABLE).eq("email", email);
    let existing: Option<User> = repository::find_one(&*services.admin_store, &query).await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let now = Utc::now();
    let hash = services.hasher.hash(&body.password)?;
    let user = repository::insert(&*services.admin_store, &body.into_user(hash, now))
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict(EMAIL_TAKEN.to_string()),
            other => ApiError::from(other),
        })?;

    let token = services.tokens.issue(&user.email, user.id, now)?;
    info!(user_id = %user.id, role = %user.role, "account registered");

    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token, &user))).into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&body.email);
    let query = Query::table(User::TABLE).eq("email", email);
    let user: Option<User> = repository::find_one(&*services.store, &query).await?;

    let Some(user) = user else {
        debug!("login for unknown email");
        return Err(ApiError::Unauthorized(BAD_LOGIN));
    };
    if !services.hasher.verify(&body.password, &user.password_hash) {
        debug!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthorized(BAD_LOGIN));
    }

    let now = Utc::now();
    let _: Option<User> =
        repository::apply_by_id(&*services.store, user.id, &LoginStamp { last_login: now })
            .await?;

    let token = services.tokens.issue(&user.email, user.id, now)?;
    Ok(Json(TokenResponse::bearer(token, &user)))
}

pub async fn me(Extension(caller): Extension<CurrentUser>) -> Json<UserView> {
    Json(UserView::from(caller.user()))
}

/// Tokens are stateless; the client drops its copy.
pub async fn logout(Extension(_caller): Extension<CurrentUser>) -> Json<MessageResponse> {
    Json(MessageResponse::new("Successfully logged out"))
}
