// handlers.rs
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::csrf;
use crate::error::{AppError, AppResult};
use crate::models::{Choice, Question, VoteForm};
use crate::templates;
use crate::AppState;

const NO_CHOICE_SELECTED: &str = "You didn't select a choice.";

#[derive(Serialize)]
struct IndexContext {
    latest_question_list: Vec<Question>,
}

#[derive(Serialize)]
struct DetailContext<'a> {
    question: &'a Question,
    choices: Vec<Choice>,
    csrf_token: String,
    error_message: Option<&'static str>,
}

#[derive(Serialize)]
struct ResultsContext {
    question: Question,
    choices: Vec<Choice>,
}

/// Parses a question id from the URL. Anything that is not a valid id is
/// treated like an unknown question.
fn parse_question_id(raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| AppError::NotFound(format!("question {raw:?}")))
}

/// Loads a question that is already published, 404 otherwise.
async fn published_question(state: &AppState, id: i64) -> AppResult<Question> {
    state
        .store
        .question(id)
        .await?
        .filter(|q| q.is_published_at(Utc::now()))
        .ok_or_else(|| AppError::NotFound(format!("question {id}")))
}

async fn render_detail(
    state: &AppState,
    question: &Question,
    error_message: Option<&'static str>,
) -> AppResult<Html<String>> {
    let context = DetailContext {
        question,
        choices: state.store.choices(question.id).await?,
        csrf_token: csrf::issue(&state.settings.secret_key, question.id, Utc::now()),
        error_message,
    };
    templates::render(&state.templates, templates::DETAIL, &context)
}

/// GET / sends visitors to the poll list.
pub async fn root() -> Redirect {
    Redirect::to("/polls/")
}

/// GET /polls/
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let latest_question_list = state.store.published_questions(Utc::now()).await?;
    templates::render(
        &state.templates,
        templates::INDEX,
        &IndexContext { latest_question_list },
    )
}

/// GET /polls/{id}/
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let question = published_question(&state, parse_question_id(&id)?).await?;
    render_detail(&state, &question, None).await
}

/// GET /polls/{id}/results/
pub async fn results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let question = published_question(&state, parse_question_id(&id)?).await?;
    let choices = state.store.choices(question.id).await?;
    templates::render(
        &state.templates,
        templates::RESULTS,
        &ResultsContext { question, choices },
    )
}

/// POST /polls/{id}/votes/
pub async fn vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<VoteForm>,
) -> AppResult<Response> {
    let question = published_question(&state, parse_question_id(&id)?).await?;

    let secret = &state.settings.secret_key;
    let token_ok = form
        .csrf_token
        .as_deref()
        .is_some_and(|token| csrf::verify(secret, question.id, token, Utc::now()));
    if !token_ok {
        return Err(AppError::Forbidden(format!("bad CSRF token for question {}", question.id)));
    }

    let voted = match form.choice_id() {
        Some(choice_id) => state.store.vote(question.id, choice_id).await?,
        None => None,
    };

    match voted {
        Some(choice) => {
            info!(
                question_id = question.id,
                choice_id = choice.id,
                votes = choice.votes,
                "Vote recorded"
            );
            Ok(Redirect::to(&format!("/polls/{}/results/", question.id)).into_response())
        }
        None => {
            debug!(question_id = question.id, choice = ?form.choice, "Vote without a valid choice");
            let page = render_detail(&state, &question, Some(NO_CHOICE_SELECTED)).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}
