use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question title cannot be empty")]
    EmptyTitle,

    #[error("question must have at least one option")]
    NoOptions,

    #[error("correct answer {answer:?} is not one of the options")]
    CorrectAnswerNotInOptions { answer: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice exam question.
///
/// Options are plain strings and the correct answer is matched by value,
/// not by position. Once sampled into a session a question never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    title: String,
    image: Option<Url>,
    options: Vec<String>,
    correct_answer: String,
}

#[derive(Deserialize)]
struct QuestionRecord {
    id: QuestionId,
    title: String,
    image: Option<Url>,
    options: Vec<String>,
    correct_answer: String,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.title,
            record.image,
            record.options,
            record.correct_answer,
        )
    }
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the id or title is blank, there are no
    /// options, or the correct answer is not among the options.
    pub fn new(
        id: QuestionId,
        title: impl Into<String>,
        image: Option<Url>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let title = title.into();
        let correct_answer = correct_answer.into();

        if id.as_str().trim().is_empty() {
            return Err(QuestionError::EmptyId);
        }
        if title.trim().is_empty() {
            return Err(QuestionError::EmptyTitle);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if !options.iter().any(|option| *option == correct_answer) {
            return Err(QuestionError::CorrectAnswerNotInOptions {
                answer: correct_answer,
            });
        }

        Ok(Self {
            id,
            title,
            image,
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Text shown when the question has no image.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn image(&self) -> Option<&Url> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
