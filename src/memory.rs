//! In-process [`PollStore`] backing the HTTP tests.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{Choice, Question};
use crate::poll::PollStore;

/// Column width of `question_text` and `choice_text` in the schema.
const TEXT_MAX_CHARS: usize = 200;

#[derive(Default)]
struct Tables {
    last_question_id: i64,
    last_choice_id: i64,
    questions: BTreeMap<i64, Question>,
    choices: BTreeMap<i64, Choice>,
}

impl Tables {
    fn newest_first(&self, keep: impl Fn(&Question) -> bool) -> Vec<Question> {
        let mut questions: Vec<Question> =
            self.questions.values().filter(|q| keep(q)).cloned().collect();
        questions.sort_by_key(|q| Reverse((q.pub_date, q.id)));
        questions
    }

    fn has_choices(&self, question_id: i64) -> bool {
        self.choices.values().any(|c| c.question_id == question_id)
    }

    fn insert_question(&mut self, question_text: &str, pub_date: DateTime<Utc>) -> Question {
        self.last_question_id += 1;
        let question = Question {
            id: self.last_question_id,
            question_text: question_text.to_string(),
            pub_date,
        };
        self.questions.insert(question.id, question.clone());
        question
    }

    fn insert_choice(&mut self, question_id: i64, choice_text: &str, votes: i32) -> Choice {
        self.last_choice_id += 1;
        let choice = Choice {
            id: self.last_choice_id,
            question_id,
            choice_text: choice_text.to_string(),
            votes,
        };
        self.choices.insert(choice.id, choice.clone());
        choice
    }
}

// Same checks the table definitions enforce in Postgres.
fn check_text(column: &str, text: &str) -> AppResult<()> {
    if text.chars().count() > TEXT_MAX_CHARS {
        return Err(AppError::Storage(format!(
            "{column} longer than {TEXT_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn check_votes(votes: i32) -> AppResult<()> {
    if votes < 0 {
        return Err(AppError::Storage("votes must be non-negative".to_string()));
    }
    Ok(())
}

/// Mirrors the Postgres store's semantics, including cascade deletes.
#[derive(Default)]
pub struct MemoryPollStore {
    tables: RwLock<Tables>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PollStore for MemoryPollStore {
    async fn published_questions(&self, now: DateTime<Utc>) -> AppResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables.newest_first(|q| q.is_published_at(now) && tables.has_choices(q.id)))
    }

    async fn all_questions(&self) -> AppResult<Vec<Question>> {
        Ok(self.tables.read().await.newest_first(|_| true))
    }

    async fn question(&self, id: i64) -> AppResult<Option<Question>> {
        Ok(self.tables.read().await.questions.get(&id).cloned())
    }

    async fn choices(&self, question_id: i64) -> AppResult<Vec<Choice>> {
        let tables = self.tables.read().await;
        Ok(tables
            .choices
            .values()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn vote(&self, question_id: i64, choice_id: i64) -> AppResult<Option<Choice>> {
        let mut tables = self.tables.write().await;
        let Some(choice) = tables
            .choices
            .get_mut(&choice_id)
            .filter(|c| c.question_id == question_id)
        else {
            return Ok(None);
        };
        choice.votes = choice
            .votes
            .checked_add(1)
            .ok_or_else(|| AppError::Storage(format!("vote count overflow on choice {choice_id}")))?;
        Ok(Some(choice.clone()))
    }

    async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> AppResult<Question> {
        check_text("question_text", question_text)?;
        Ok(self.tables.write().await.insert_question(question_text, pub_date))
    }

    async fn create_question_with_choices(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
        choice_texts: &[String],
    ) -> AppResult<(Question, Vec<Choice>)> {
        // Validate everything before taking the lock so a failure writes nothing.
        check_text("question_text", question_text)?;
        for text in choice_texts {
            check_text("choice_text", text)?;
        }

        let mut tables = self.tables.write().await;
        let question = tables.insert_question(question_text, pub_date);
        let choices = choice_texts
            .iter()
            .map(|text| tables.insert_choice(question.id, text, 0))
            .collect();
        Ok((question, choices))
    }

    async fn create_choice(
        &self,
        question_id: i64,
        choice_text: &str,
        votes: i32,
    ) -> AppResult<Option<Choice>> {
        check_text("choice_text", choice_text)?;
        check_votes(votes)?;

        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&question_id) {
            return Ok(None);
        }
        Ok(Some(tables.insert_choice(question_id, choice_text, votes)))
    }

    async fn delete_question(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.questions.remove(&id).is_none() {
            return Ok(false);
        }
        tables.choices.retain(|_, c| c.question_id != id);
        Ok(true)
    }
}
