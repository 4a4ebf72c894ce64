//! 통합 테스트 공용 도우미.

#![allow(dead_code)]

use std::sync::Arc;

use account_api::auth::{AuthFlow, ExpiryPolicy, SigningSecret};
use account_api::{create_api_router, AppState, MemoryUserStore};
use account_events::{EventDispatcher, PublishedEvent, QueueNames, RecordingPublisher};
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, Response},
    Router,
};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;

pub const SECRET: &str = "integration-secret-key-minimum-32-characters";
pub const ACCESS_TTL: i64 = 3600;
pub const REFRESH_TTL: i64 = ACCESS_TTL * 7;

pub struct TestApp {
    pub router: Router,
    pub published: UnboundedReceiver<PublishedEvent>,
}

fn build(publisher: RecordingPublisher, published: UnboundedReceiver<PublishedEvent>) -> TestApp {
    let events = EventDispatcher::new(
        Arc::new(publisher),
        QueueNames::new("user.created", "user.updated"),
    );
    let auth = AuthFlow::new(
        &SigningSecret::new(SECRET),
        ExpiryPolicy::new(ACCESS_TTL, REFRESH_TTL),
    );
    let state = AppState::new(Arc::new(MemoryUserStore::new()), auth, events);

    TestApp {
        router: create_api_router().with_state(Arc::new(state)),
        published,
    }
}

/// 발행이 항상 성공하는 앱.
pub fn app() -> TestApp {
    let (publisher, published) = RecordingPublisher::new();
    build(publisher, published)
}

/// 발행이 항상 실패하는 앱.
pub fn app_with_failing_broker() -> TestApp {
    let (publisher, published) = RecordingPublisher::failing("connection refused");
    build(publisher, published)
}

pub fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn signup_body(username: &str, email: &str, password: &str) -> Value {
    serde_json::json!({
        "username": username,
        "email": email,
        "password": password,
        "confirmPassword": password,
    })
}
