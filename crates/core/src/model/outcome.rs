use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamOutcomeError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("answered ({answered}) exceeds total questions ({total})")]
    CountMismatch { total: usize, answered: usize },
}

/// Final pass/fail verdict. Absent when the user abandoned the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
}

/// Why a session left `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every question answered within the wrong-answer budget.
    Passed,
    /// The wrong-answer budget was reached before the end.
    WrongAnswerBudget,
    /// Every question answered, but too many of them wrong.
    FinalScore,
    /// The countdown reached zero.
    TimeExpired,
    /// The user abandoned the exam.
    TerminatedByUser,
}

impl TerminationReason {
    #[must_use]
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            Self::Passed => Some(Verdict::Passed),
            Self::WrongAnswerBudget | Self::FinalScore | Self::TimeExpired => Some(Verdict::Failed),
            Self::TerminatedByUser => None,
        }
    }
}

/// Record handed to a results sink once a session reaches a terminal phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OutcomeRecord")]
pub struct ExamOutcome {
    total_questions: usize,
    correct: usize,
    wrong: usize,
    reason: TerminationReason,
    time_used_secs: u32,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct OutcomeRecord {
    total_questions: usize,
    correct: usize,
    wrong: usize,
    reason: TerminationReason,
    time_used_secs: u32,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl TryFrom<OutcomeRecord> for ExamOutcome {
    type Error = ExamOutcomeError;

    fn try_from(record: OutcomeRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.total_questions,
            record.correct,
            record.wrong,
            record.reason,
            record.time_used_secs,
            record.started_at,
            record.finished_at,
        )
    }
}

impl ExamOutcome {
    /// Build an outcome record.
    ///
    /// # Errors
    ///
    /// Returns `ExamOutcomeError::InvalidTimeRange` if `finished_at` is before `started_at`.
    /// Returns `ExamOutcomeError::CountMismatch` if more answers than questions are reported.
    pub fn new(
        total_questions: usize,
        correct: usize,
        wrong: usize,
        reason: TerminationReason,
        time_used_secs: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, ExamOutcomeError> {
        if finished_at < started_at {
            return Err(ExamOutcomeError::InvalidTimeRange);
        }
        let answered = correct.saturating_add(wrong);
        if answered > total_questions {
            return Err(ExamOutcomeError::CountMismatch {
                total: total_questions,
                answered,
            });
        }

        Ok(Self {
            total_questions,
            correct,
            wrong,
            reason,
            time_used_secs,
            started_at,
            finished_at,
        })
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> usize {
        self.wrong
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total_questions - self.correct - self.wrong
    }

    #[must_use]
    pub fn reason(&self) -> TerminationReason {
        self.reason
    }

    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        self.reason.verdict()
    }

    #[must_use]
    pub fn time_used_secs(&self) -> u32 {
        self.time_used_secs
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn outcome_reports_unanswered_and_verdict() {
        let now = fixed_now();
        let outcome = ExamOutcome::new(30, 20, 4, TerminationReason::WrongAnswerBudget, 600, now, now)
            .unwrap();

        assert_eq!(outcome.unanswered(), 6);
        assert_eq!(outcome.verdict(), Some(Verdict::Failed));
    }

    #[test]
    fn terminated_outcome_has_no_verdict() {
        let now = fixed_now();
        let outcome =
            ExamOutcome::new(30, 0, 0, TerminationReason::TerminatedByUser, 5, now, now).unwrap();
        assert_eq!(outcome.verdict(), None);
    }

    #[test]
    fn outcome_rejects_inconsistent_counts() {
        let now = fixed_now();
        let err = ExamOutcome::new(2, 2, 1, TerminationReason::FinalScore, 0, now, now).unwrap_err();
        assert_eq!(err, ExamOutcomeError::CountMismatch { total: 2, answered: 3 });

        let earlier = now - chrono::Duration::seconds(1);
        let err = ExamOutcome::new(2, 1, 1, TerminationReason::FinalScore, 0, now, earlier)
            .unwrap_err();
        assert_eq!(err, ExamOutcomeError::InvalidTimeRange);
    }

    #[test]
    fn deserialize_rejects_more_answers_than_questions() {
        let now = fixed_now();
        let outcome = ExamOutcome::new(30, 27, 3, TerminationReason::Passed, 900, now, now).unwrap();
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(serde_json::from_str::<ExamOutcome>(&json).unwrap(), outcome);

        let tampered = json.replace("\"correct\":27", "\"correct\":40");
        let err = serde_json::from_str::<ExamOutcome>(&tampered).unwrap_err();
        assert!(err.to_string().contains("exceeds total questions"));
    }
}
