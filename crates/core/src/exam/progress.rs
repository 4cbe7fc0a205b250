use serde::Serialize;

use crate::model::Question;

use super::session::{ExamPhase, FailureReason};

/// State of one segment in the exam progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMark {
    Correct,
    Wrong,
    /// The unanswered question under the cursor. Never reported once the exam is over.
    Current,
    Unanswered,
}

/// Read-only view of a session, handed to whatever renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamSnapshot {
    pub phase: ExamPhase,
    pub failure_reason: Option<FailureReason>,
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub max_wrong_allowed: usize,
    pub time_remaining_secs: u32,
    pub current_question: Option<Question>,
    pub current_answer: Option<String>,
    pub auto_advance: bool,
    pub reorder_locked: bool,
}

impl ExamSnapshot {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// 1-based position, as shown in the `n/total` counter.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current_index + 1
    }
}

/// Hover/review card for an answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub index: usize,
    pub question: Question,
    pub user_answer: String,
    pub is_correct: bool,
}

impl QuestionReview {
    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.question.correct_answer()
    }
}
