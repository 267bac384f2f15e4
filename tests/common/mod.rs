//! Shared helpers for the HTTP-level tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use premiosplatzi::{
    config::Settings,
    memory::MemoryPollStore,
    models::{Choice, Question},
    poll::PollStore,
    routes, AppState,
};
use tower::ServiceExt;

pub const SECRET_KEY: &str = "test-secret-key";
pub const ADMIN_TOKEN: &str = "admin-test-token";

pub struct TestApp {
    pub store: Arc<MemoryPollStore>,
    pub router: Router,
}

fn settings(admin: bool) -> Settings {
    let mut vars = HashMap::from([
        ("SECRET_KEY", SECRET_KEY.to_string()),
        (
            "STATIC_ROOT",
            format!("{}/staticfiles", env!("CARGO_MANIFEST_DIR")),
        ),
    ]);
    if admin {
        vars.insert("ADMIN_TOKEN", ADMIN_TOKEN.to_string());
    }
    Settings::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(false)
    }

    pub fn with_admin() -> Self {
        Self::build(true)
    }

    fn build(admin: bool) -> Self {
        let store = Arc::new(MemoryPollStore::new());
        let shared: Arc<dyn PollStore> = store.clone();
        let state = AppState::new(shared, settings(admin)).unwrap();
        Self {
            store,
            router: routes::create_routes(state),
        }
    }

    /// Creates a question published `days` from now (negative for the past).
    pub async fn create_question(&self, question_text: &str, days: i64) -> Question {
        self.store
            .create_question(question_text, Utc::now() + Duration::days(days))
            .await
            .unwrap()
    }

    pub async fn create_choice(&self, question_id: i64, choice_text: &str, votes: i32) -> Choice {
        self.store
            .create_choice(question_id, choice_text, votes)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: String) -> Response<Body> {
        let request = Request::post(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
