use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::{debug, info};

use careops_core::{ConversationId, Record};
use careops_inbox::{
    Conversation, ConversationActivity, Message, NewConversation, NewMessage, Sender,
};
use careops_infra::{Query, repository};

use crate::app::errors::ApiError;
use crate::app::extract::{Payload, parse_id};
use crate::app::services::AppServices;
use crate::authz::require_staff_or_admin;
use crate::context::CurrentUser;

const CONVERSATION: &str = "Conversation";

pub fn router() -> Router {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route("/messages", post(send_message))
        .route("/messages/:conversation_id", get(list_messages))
}

pub async fn list_conversations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    require_staff_or_admin(&caller)?;

    let query = Query::table(Conversation::TABLE).order_by("updated_at", true);
    let conversations: Vec<Conversation> = repository::list(&*services.store, &query).await?;
    Ok(Json(conversations))
}

pub async fn create_conversation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewConversation>,
) -> Result<Response, ApiError> {
    require_staff_or_admin(&caller)?;

    let conversation =
        repository::insert(&*services.store, &body.into_conversation(Utc::now())).await?;
    info!(conversation_id = %conversation.id, "conversation created");
    Ok((StatusCode::CREATED, Json(conversation)).into_response())
}

/// An unknown conversation simply has no messages.
pub async fn list_messages(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    require_staff_or_admin(&caller)?;
    let conversation_id: ConversationId = parse_id(&conversation_id, CONVERSATION)?;

    let query = Query::table(Message::TABLE)
        .eq("conversation_id", conversation_id)
        .order_by("created_at", false);
    let messages: Vec<Message> = repository::list(&*services.store, &query).await?;
    Ok(Json(messages))
}

pub async fn send_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CurrentUser>,
    Payload(body): Payload<NewMessage>,
) -> Result<Response, ApiError> {
    require_staff_or_admin(&caller)?;
    let store = &*services.store;

    let conversation: Option<Conversation> =
        repository::find_by_id(store, body.conversation_id).await?;
    if conversation.is_none() {
        return Err(ApiError::not_found(CONVERSATION));
    }

    let sender = Sender {
        id: caller.id(),
        name: caller.user().username.clone(),
    };
    let now = Utc::now();
    let message = repository::insert(store, &body.into_message(sender, now)).await?;

    let activity = ConversationActivity::from(&message);
    let touched: Option<Conversation> =
        repository::update_by_id(store, message.conversation_id, &activity, now).await?;
    if touched.is_none() {
        debug!(
            conversation_id = %message.conversation_id,
            "conversation removed before activity update"
        );
    }

    Ok((StatusCode::CREATED, Json(message)).into_response())
}
