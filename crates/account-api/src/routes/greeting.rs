//! 루트 인사 endpoint.

use std::sync::Arc;

use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use super::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GreetingQuery {
    /// 인사할 이름 (없거나 비어 있으면 "World")
    pub name: Option<String>,
}

/// `GET /?name=<name>`
#[utoipa::path(
    get,
    path = "/",
    tag = "greeting",
    responses((status = 200, description = "인사 메시지", body = MessageResponse))
)]
pub async fn greet(Query(query): Query<GreetingQuery>) -> Json<MessageResponse> {
    let name = query
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or("World");
    Json(MessageResponse::new(format!("Hello, {name}!")))
}

pub fn greeting_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(greet))
}
