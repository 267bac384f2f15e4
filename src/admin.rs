//! JSON admin API for managing questions and choices.
//!
//! Mounted under `/admin` only when an admin token is configured. Every
//! request must carry `Authorization: Bearer <token>`.

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use http::{header::AUTHORIZATION, StatusCode};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Choice, NewChoice, NewQuestion, Question, QuestionSummary};
use crate::AppState;

/// Admin-side error: same variants as [`AppError`], rendered as JSON.
#[derive(Debug)]
pub struct AdminError(AppError);

impl From<AppError> for AdminError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for AdminError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        self.0.into_json_response()
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Debug, Serialize)]
pub struct CreatedQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// Constant-time comparison of the configured and presented tokens.
fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// Rejects requests whose bearer token does not match the configured one.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = state.settings.admin_token.as_deref();
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match (expected, presented) {
        (Some(expected), Some(presented)) if tokens_match(expected, presented) => {
            next.run(request).await
        }
        _ => AppError::Unauthorized.into_json_response(),
    }
}

/// GET /admin/questions
pub async fn list_questions(State(state): State<AppState>) -> AdminResult<Json<Vec<QuestionSummary>>> {
    let now = Utc::now();
    let mut summaries = Vec::new();
    for question in state.store.all_questions().await? {
        let choices = state.store.choices(question.id).await?;
        summaries.push(QuestionSummary {
            was_published_recently: question.was_published_recently_at(now),
            question,
            choices,
        });
    }
    Ok(Json(summaries))
}

/// POST /admin/questions
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<NewQuestion>,
) -> AdminResult<(StatusCode, Json<CreatedQuestion>)> {
    payload.validate()?;

    let pub_date = payload.pub_date.unwrap_or_else(Utc::now);
    let (question, choices) = state
        .store
        .create_question_with_choices(&payload.question_text, pub_date, &payload.choices)
        .await?;

    info!(question_id = question.id, choices = choices.len(), "Question created");
    Ok((StatusCode::CREATED, Json(CreatedQuestion { question, choices })))
}

/// POST /admin/questions/{id}/choices
pub async fn create_choice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewChoice>,
) -> AdminResult<(StatusCode, Json<Choice>)> {
    payload.validate()?;

    let choice = state
        .store
        .create_choice(id, &payload.choice_text, payload.votes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("question {id}")))?;

    info!(question_id = id, choice_id = choice.id, "Choice created");
    Ok((StatusCode::CREATED, Json(choice)))
}

/// DELETE /admin/questions/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<StatusCode> {
    if !state.store.delete_question(id).await? {
        return Err(AppError::NotFound(format!("question {id}")).into());
    }
    info!(question_id = id, "Question deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_only_when_identical() {
        assert!(tokens_match("admin-token", "admin-token"));
        assert!(!tokens_match("admin-token", "admin-tokeN"));
        assert!(!tokens_match("admin-token", "admin"));
        assert!(!tokens_match("admin-token", ""));
    }
}
