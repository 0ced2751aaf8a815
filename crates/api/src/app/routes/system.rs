use std::sync::Arc;

use axum::{Json, extract::Extension};
use serde_json::{Value, json};

use crate::app::services::AppServices;

pub async fn root(Extension(services): Extension<Arc<AppServices>>) -> Json<Value> {
    Json(json!({
        "name": services.info.name,
        "version": services.info.version,
        "status": "online",
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
