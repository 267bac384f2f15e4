// src/poll.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{Choice, Question};

/// Persistence for questions and their choices.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Questions with `pub_date <= now` that have at least one choice,
    /// newest first.
    async fn published_questions(&self, now: DateTime<Utc>) -> AppResult<Vec<Question>>;

    /// Every question regardless of publish date, newest first.
    async fn all_questions(&self) -> AppResult<Vec<Question>>;

    async fn question(&self, id: i64) -> AppResult<Option<Question>>;

    async fn choices(&self, question_id: i64) -> AppResult<Vec<Choice>>;

    /// Adds one vote to `choice_id` if it belongs to `question_id`.
    /// Returns the updated choice, or `None` when nothing matched.
    async fn vote(&self, question_id: i64, choice_id: i64) -> AppResult<Option<Choice>>;

    async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> AppResult<Question>;

    /// Creates a question and its choices as one unit: either all rows are
    /// written or none are.
    async fn create_question_with_choices(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
        choice_texts: &[String],
    ) -> AppResult<(Question, Vec<Choice>)>;

    /// Returns `None` when the question does not exist.
    async fn create_choice(
        &self,
        question_id: i64,
        choice_text: &str,
        votes: i32,
    ) -> AppResult<Option<Choice>>;

    /// Deletes a question and its choices. Returns false when it did not exist.
    async fn delete_question(&self, id: i64) -> AppResult<bool>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgPollStore {
    async fn published_questions(&self, now: DateTime<Utc>) -> AppResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT q.id, q.question_text, q.pub_date
            FROM polls_question q
            WHERE q.pub_date <= $1
              AND EXISTS (SELECT 1 FROM polls_choice c WHERE c.question_id = q.id)
            ORDER BY q.pub_date DESC, q.id DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn all_questions(&self) -> AppResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM polls_question ORDER BY pub_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn question(&self, id: i64) -> AppResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM polls_question WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn choices(&self, question_id: i64) -> AppResult<Vec<Choice>> {
        let choices = sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, votes FROM polls_choice WHERE question_id = $1 ORDER BY id",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(choices)
    }

    async fn vote(&self, question_id: i64, choice_id: i64) -> AppResult<Option<Choice>> {
        // Single statement so concurrent votes never lose an increment.
        let choice = sqlx::query_as::<_, Choice>(
            r#"
            UPDATE polls_choice
            SET votes = votes + 1
            WHERE id = $1 AND question_id = $2
            RETURNING id, question_id, choice_text, votes
            "#,
        )
        .bind(choice_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(choice)
    }

    async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> AppResult<Question> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO polls_question (question_text, pub_date)
            VALUES ($1, $2)
            RETURNING id, question_text, pub_date
            "#,
        )
        .bind(question_text)
        .bind(pub_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    async fn create_question_with_choices(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
        choice_texts: &[String],
    ) -> AppResult<(Question, Vec<Choice>)> {
        // Dropping `tx` on an early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO polls_question (question_text, pub_date)
            VALUES ($1, $2)
            RETURNING id, question_text, pub_date
            "#,
        )
        .bind(question_text)
        .bind(pub_date)
        .fetch_one(&mut *tx)
        .await?;

        let mut choices = Vec::with_capacity(choice_texts.len());
        for text in choice_texts {
            let choice = sqlx::query_as::<_, Choice>(
                r#"
                INSERT INTO polls_choice (question_id, choice_text, votes)
                VALUES ($1, $2, 0)
                RETURNING id, question_id, choice_text, votes
                "#,
            )
            .bind(question.id)
            .bind(text.as_str())
            .fetch_one(&mut *tx)
            .await?;
            choices.push(choice);
        }

        tx.commit().await?;
        Ok((question, choices))
    }

    async fn create_choice(
        &self,
        question_id: i64,
        choice_text: &str,
        votes: i32,
    ) -> AppResult<Option<Choice>> {
        let choice = sqlx::query_as::<_, Choice>(
            r#"
            INSERT INTO polls_choice (question_id, choice_text, votes)
            SELECT q.id, $2, $3 FROM polls_question q WHERE q.id = $1
            RETURNING id, question_id, choice_text, votes
            "#,
        )
        .bind(question_id)
        .bind(choice_text)
        .bind(votes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(choice)
    }

    async fn delete_question(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM polls_question WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
