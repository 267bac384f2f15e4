//! Tests for the token-guarded admin API.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{body_text, TestApp, ADMIN_TOKEN};
use premiosplatzi::poll::PollStore;
use serde_json::{json, Value};

fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {ADMIN_TOKEN}"));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = TestApp::with_admin();

    let response = app.get("/admin/questions").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "UNAUTHORIZED");

    let request = Request::get("/admin/questions")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_question_with_choices() {
    let app = TestApp::with_admin();
    let payload = json!({
        "question_text": "Cuál es tu curso favorito?",
        "choices": ["Curso Básico de Django", "Curso de Introducción a la Nube con Azure"],
    });

    let response = app
        .send(admin_request("POST", "/admin/questions", Some(payload)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["question_text"], "Cuál es tu curso favorito?");
    assert_eq!(created["choices"].as_array().unwrap().len(), 2);
    assert_eq!(created["choices"][0]["votes"], 0);

    // Published now with choices, so the public index lists it.
    let index = body_text(app.get("/polls/").await).await;
    assert!(index.contains("Cuál es tu curso favorito?"));
}

#[tokio::test]
async fn create_question_rejects_long_text() {
    let app = TestApp::with_admin();
    let payload = json!({ "question_text": "x".repeat(201) });

    let response = app
        .send(admin_request("POST", "/admin/questions", Some(payload)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    assert!(app.store.all_questions().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_includes_unpublished_questions() {
    let app = TestApp::with_admin();
    let future = app.create_question("future question", 30).await;
    let recent = app.create_question("recent question", 0).await;
    app.create_choice(recent.id, "choice", 2).await;

    let response = app
        .send(admin_request("GET", "/admin/questions", None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);

    assert_eq!(listed[0]["id"], future.id);
    assert_eq!(listed[0]["was_published_recently"], false);
    assert_eq!(listed[1]["id"], recent.id);
    assert_eq!(listed[1]["was_published_recently"], true);
    assert_eq!(listed[1]["choices"][0]["votes"], 2);
}

#[tokio::test]
async fn add_choice_to_question() {
    let app = TestApp::with_admin();
    let question = app.create_question("past question", -1).await;

    let response = app
        .send(admin_request(
            "POST",
            &format!("/admin/questions/{}/choices", question.id),
            Some(json!({ "choice_text": "choice 1" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let choice = json_body(response).await;
    assert_eq!(choice["question_id"], question.id);
    assert_eq!(choice["votes"], 0);

    let response = app
        .send(admin_request(
            "POST",
            "/admin/questions/999/choices",
            Some(json!({ "choice_text": "orphan" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(admin_request(
            "POST",
            &format!("/admin/questions/{}/choices", question.id),
            Some(json!({ "choice_text": "negative", "votes": -3 })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_question_cascades() {
    let app = TestApp::with_admin();
    let question = app
        .store
        .create_question("past question", Utc::now() - Duration::days(2))
        .await
        .unwrap();
    app.create_choice(question.id, "choice 1", 0).await;

    let uri = format!("/admin/questions/{}", question.id);
    let response = app.send(admin_request("DELETE", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.store.choices(question.id).await.unwrap().is_empty());

    let response = app.send(admin_request("DELETE", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
