// models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// True when the question went live within the last day and is not scheduled.
    pub fn was_published_recently(&self) -> bool {
        self.was_published_recently_at(Utc::now())
    }

    pub fn was_published_recently_at(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) < self.pub_date && self.pub_date <= now
    }

    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i32,
}

/// Body of `POST /polls/{id}/votes/`. Both fields are optional so a
/// missing selection re-renders the form instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
    pub csrf_token: Option<String>,
}

impl VoteForm {
    /// The selected choice id, if one was submitted and is numeric.
    pub fn choice_id(&self) -> Option<i64> {
        self.choice.as_deref()?.trim().parse().ok()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(length(min = 1, max = 200))]
    pub question_text: String,
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(custom(function = "validate_choice_texts"))]
    pub choices: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewChoice {
    #[validate(length(min = 1, max = 200))]
    pub choice_text: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub votes: i32,
}

fn validate_choice_texts(choices: &[String]) -> Result<(), validator::ValidationError> {
    if choices
        .iter()
        .any(|text| text.is_empty() || text.chars().count() > 200)
    {
        return Err(validator::ValidationError::new("choice_text_length"));
    }
    Ok(())
}

/// Admin listing row: a question with its choices and display flags.
#[derive(Debug, Serialize)]
pub struct QuestionSummary {
    #[serde(flatten)]
    pub question: Question,
    pub was_published_recently: bool,
    pub choices: Vec<Choice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_at(pub_date: DateTime<Utc>) -> Question {
        Question {
            id: 1,
            question_text: "¿Cual es el mejor Course Director de Platzi?".to_string(),
            pub_date,
        }
    }

    #[test]
    fn future_question_is_not_recent() {
        let now = Utc::now();
        assert!(!question_at(now + Duration::days(30)).was_published_recently_at(now));
    }

    #[test]
    fn present_question_is_recent() {
        let now = Utc::now();
        assert!(question_at(now).was_published_recently_at(now));
    }

    #[test]
    fn old_question_is_not_recent() {
        let now = Utc::now();
        assert!(!question_at(now - Duration::days(30)).was_published_recently_at(now));
    }

    #[test]
    fn recent_window_is_open_at_one_day() {
        let now = Utc::now();
        assert!(!question_at(now - Duration::days(1)).was_published_recently_at(now));
        let just_inside = now - Duration::hours(23) - Duration::minutes(59) - Duration::seconds(59);
        assert!(question_at(just_inside).was_published_recently_at(now));
        assert!(!question_at(now + Duration::seconds(1)).was_published_recently_at(now));
    }

    #[test]
    fn vote_form_parses_choice_id() {
        let form = VoteForm { choice: Some(" 42 ".into()), csrf_token: None };
        assert_eq!(form.choice_id(), Some(42));
        let form = VoteForm { choice: Some("abc".into()), csrf_token: None };
        assert_eq!(form.choice_id(), None);
        assert_eq!(VoteForm::default().choice_id(), None);
    }

    #[test]
    fn new_question_rejects_blank_choices() {
        let payload = NewQuestion {
            question_text: "Cuál es tu curso favorito?".into(),
            pub_date: None,
            choices: vec!["Django".into(), String::new()],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn new_choice_rejects_negative_votes() {
        let payload = NewChoice { choice_text: "Django".into(), votes: -1 };
        assert!(payload.validate().is_err());
    }
}
