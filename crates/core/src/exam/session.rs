use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{ExamConfiguration, ExamOutcome, Question, TerminationReason};
use crate::scoring;

use super::progress::{ExamSnapshot, ProgressMark, QuestionReview};
use super::reorder::defer_to_end;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for exam")]
    NoQuestions,
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of an exam. Every phase except `InProgress` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamPhase {
    InProgress,
    TerminatedByUser,
    CompletedPassed,
    CompletedFailed,
}

impl ExamPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExamPhase::InProgress)
    }
}

/// Why a `CompletedFailed` exam failed. Each reason gets its own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Wrong answers reached the budget before the end.
    WrongAnswerBudget,
    /// All questions answered, verdict computed as failed.
    FinalScore,
    /// The countdown ran out. Fails regardless of the score so far.
    TimeExpired,
}

//
// ─── COMMAND OUTCOMES ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Slot already answered, session over, or a reorder is settling.
    Ignored,
    Correct,
    Wrong,
    /// The wrong answer used up the budget; the exam is now failed.
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Ticked { remaining: u32 },
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Authoritative state of one exam attempt.
///
/// `questions` and `answers` are index-aligned and only ever move together.
/// Once the phase is terminal, answers, counters and the cursor are frozen;
/// only `restart_same_questions` brings the session back.
#[derive(Clone)]
pub struct ExamSession {
    config: ExamConfiguration,
    questions: Vec<Question>,
    answers: Vec<Option<String>>,
    current: usize,
    correct: usize,
    wrong: usize,
    time_remaining: u32,
    phase: ExamPhase,
    failure: Option<FailureReason>,
    auto_advance: bool,
    pending_advance: Option<usize>,
    reorder_locked: bool,
    started_at: DateTime<Utc>,
}

impl ExamSession {
    /// Start an exam over an already sampled question set.
    ///
    /// The set may be shorter than the configured target when the bank was
    /// short; scoring always uses the actual length.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NoQuestions` if `questions` is empty.
    pub fn new(
        config: ExamConfiguration,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::NoQuestions);
        }

        let answers = vec![None; questions.len()];
        let time_remaining = config.time_budget_secs();
        info!(
            category = config.category(),
            questions = questions.len(),
            time_budget_secs = time_remaining,
            "exam session started"
        );

        Ok(Self {
            config,
            questions,
            answers,
            current: 0,
            correct: 0,
            wrong: 0,
            time_remaining,
            phase: ExamPhase::InProgress,
            failure: None,
            auto_advance: false,
            pending_advance: None,
            reorder_locked: false,
            started_at,
        })
    }

    #[must_use]
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    // ─── Accessors ────────────────────────────────────────────────────────

    #[must_use]
    pub fn configuration(&self) -> &ExamConfiguration {
        &self.config
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&str> {
        self.answers.get(self.current).and_then(|a| a.as_deref())
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.wrong
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn all_answered(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn max_wrong_allowed(&self) -> usize {
        scoring::max_wrong_allowed(self.total())
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn time_used(&self) -> u32 {
        self.config
            .time_budget_secs()
            .saturating_sub(self.time_remaining)
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.phase == ExamPhase::InProgress
    }

    #[must_use]
    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    #[must_use]
    pub fn is_reorder_locked(&self) -> bool {
        self.reorder_locked
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Terminal reason, or `None` while the exam is running.
    #[must_use]
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match (self.phase, self.failure) {
            (ExamPhase::InProgress, _) => None,
            (ExamPhase::TerminatedByUser, _) => Some(TerminationReason::TerminatedByUser),
            (ExamPhase::CompletedPassed, _) => Some(TerminationReason::Passed),
            (ExamPhase::CompletedFailed, Some(FailureReason::TimeExpired)) => {
                Some(TerminationReason::TimeExpired)
            }
            (ExamPhase::CompletedFailed, Some(FailureReason::FinalScore)) => {
                Some(TerminationReason::FinalScore)
            }
            (ExamPhase::CompletedFailed, Some(FailureReason::WrongAnswerBudget) | None) => {
                Some(TerminationReason::WrongAnswerBudget)
            }
        }
    }

    /// Results record for a finished exam; `None` while still running.
    #[must_use]
    pub fn outcome(&self, finished_at: DateTime<Utc>) -> Option<ExamOutcome> {
        let reason = self.termination_reason()?;
        ExamOutcome::new(
            self.total(),
            self.correct,
            self.wrong,
            reason,
            self.time_used(),
            self.started_at,
            finished_at.max(self.started_at),
        )
        .ok()
    }

    // ─── Projections ──────────────────────────────────────────────────────

    #[must_use]
    pub fn snapshot(&self) -> ExamSnapshot {
        ExamSnapshot {
            phase: self.phase,
            failure_reason: self.failure,
            current_index: self.current,
            total: self.total(),
            answered: self.answered_count(),
            correct: self.correct,
            wrong: self.wrong,
            max_wrong_allowed: self.max_wrong_allowed(),
            time_remaining_secs: self.time_remaining,
            current_question: self.current_question().cloned(),
            current_answer: self.current_answer().map(str::to_owned),
            auto_advance: self.auto_advance,
            reorder_locked: self.reorder_locked,
        }
    }

    #[must_use]
    pub fn progress_marks(&self) -> Vec<ProgressMark> {
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(index, (question, answer))| match answer {
                Some(answer) if question.is_correct(answer) => ProgressMark::Correct,
                Some(_) => ProgressMark::Wrong,
                None if index == self.current && self.is_in_progress() => ProgressMark::Current,
                None => ProgressMark::Unanswered,
            })
            .collect()
    }

    /// Review data for an answered question; `None` if unanswered or out of range.
    #[must_use]
    pub fn review(&self, index: usize) -> Option<QuestionReview> {
        let question = self.questions.get(index)?;
        let answer = self.answers.get(index)?.as_ref()?;
        Some(QuestionReview {
            index,
            question: question.clone(),
            user_answer: answer.clone(),
            is_correct: question.is_correct(answer),
        })
    }

    // ─── Commands ─────────────────────────────────────────────────────────

    /// Record `option` as the answer to the current question.
    pub fn submit_answer(&mut self, option: &str) -> AnswerOutcome {
        if !self.is_in_progress() || self.reorder_locked {
            debug!(phase = ?self.phase, locked = self.reorder_locked, "answer ignored");
            return AnswerOutcome::Ignored;
        }
        let index = self.current;
        let Some(question) = self.questions.get(index) else {
            return AnswerOutcome::Ignored;
        };
        let is_correct = question.is_correct(option);
        let Some(slot) = self.answers.get_mut(index) else {
            return AnswerOutcome::Ignored;
        };
        if slot.is_some() {
            debug!(index, "question already answered");
            return AnswerOutcome::Ignored;
        }
        *slot = Some(option.to_owned());

        let outcome = if is_correct {
            self.correct += 1;
            AnswerOutcome::Correct
        } else {
            self.wrong += 1;
            if scoring::budget_exhausted(self.total(), self.wrong) {
                self.fail(FailureReason::WrongAnswerBudget);
                return AnswerOutcome::BudgetExhausted;
            }
            AnswerOutcome::Wrong
        };
        debug!(index, correct = self.correct, wrong = self.wrong, "answer recorded");

        if self.auto_advance && index + 1 < self.total() {
            self.pending_advance = Some(index);
        }
        outcome
    }

    /// Apply the advance scheduled by an auto-advancing answer.
    ///
    /// Does nothing if the user moved, reordered, or the exam ended since.
    pub fn complete_auto_advance(&mut self) -> bool {
        let Some(from) = self.pending_advance.take() else {
            return false;
        };
        if !self.is_in_progress() || self.current != from || from + 1 >= self.total() {
            return false;
        }
        self.current = from + 1;
        true
    }

    /// Move forward; on the last question, finish the exam if every question is answered.
    pub fn go_next(&mut self) -> bool {
        if !self.is_in_progress() {
            return false;
        }
        self.pending_advance = None;

        if self.current + 1 < self.total() {
            self.current += 1;
            return true;
        }
        if !self.all_answered() {
            return false;
        }

        if scoring::is_passing(self.total(), self.correct) {
            self.phase = ExamPhase::CompletedPassed;
            self.reorder_locked = false;
            info!(correct = self.correct, total = self.total(), "exam passed");
        } else {
            self.fail(FailureReason::FinalScore);
        }
        true
    }

    pub fn go_prev(&mut self) -> bool {
        if !self.is_in_progress() || self.current == 0 {
            return false;
        }
        self.pending_advance = None;
        self.current -= 1;
        true
    }

    /// Jump straight to a question, as a click on the progress bar does.
    pub fn go_to(&mut self, index: usize) -> bool {
        if !self.is_in_progress() || index >= self.total() || index == self.current {
            return false;
        }
        self.pending_advance = None;
        self.current = index;
        true
    }

    /// User-initiated abandonment. Confirmation is the caller's business.
    pub fn terminate(&mut self) -> bool {
        if !self.is_in_progress() {
            return false;
        }
        self.phase = ExamPhase::TerminatedByUser;
        self.pending_advance = None;
        self.reorder_locked = false;
        info!(answered = self.answered_count(), "exam terminated by user");
        true
    }

    /// One second of the countdown.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_in_progress() {
            return TickOutcome::Ignored;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.fail(FailureReason::TimeExpired);
            return TickOutcome::Expired;
        }
        TickOutcome::Ticked {
            remaining: self.time_remaining,
        }
    }

    /// Move the current question (and its answer) to the end of the queue.
    ///
    /// Takes the reorder lock; answers and further reorders are refused until
    /// `settle_reorder` is called.
    pub fn defer_current(&mut self) -> bool {
        if !self.is_in_progress() || self.reorder_locked {
            return false;
        }
        let Some(next) = defer_to_end(&mut self.questions, &mut self.answers, self.current) else {
            return false;
        };
        debug!(from = self.current, to = next, "question deferred to end");
        self.current = next;
        self.pending_advance = None;
        self.reorder_locked = true;
        true
    }

    /// Release the reorder lock once the move has visually settled.
    pub fn settle_reorder(&mut self) -> bool {
        std::mem::replace(&mut self.reorder_locked, false)
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
        if !enabled {
            self.pending_advance = None;
        }
    }

    /// Retake the exam over the same questions in the same order.
    pub fn restart_same_questions(&mut self, restarted_at: DateTime<Utc>) {
        self.answers = vec![None; self.questions.len()];
        self.current = 0;
        self.correct = 0;
        self.wrong = 0;
        self.time_remaining = self.config.time_budget_secs();
        self.phase = ExamPhase::InProgress;
        self.failure = None;
        self.pending_advance = None;
        self.reorder_locked = false;
        self.started_at = restarted_at;
        info!(questions = self.total(), "exam restarted with same questions");
    }

    fn fail(&mut self, reason: FailureReason) {
        self.phase = ExamPhase::CompletedFailed;
        self.failure = Some(reason);
        self.pending_advance = None;
        self.reorder_locked = false;
        info!(
            ?reason,
            correct = self.correct,
            wrong = self.wrong,
            total = self.total(),
            "exam failed"
        );
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("category", &self.config.category())
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("correct", &self.correct)
            .field("wrong", &self.wrong)
            .field("time_remaining", &self.time_remaining)
            .field("phase", &self.phase)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use crate::time::fixed_now;

    fn build_question(id: usize) -> Question {
        Question::new(
            QuestionId::new(format!("q{id}")),
            format!("Question {id}"),
            None,
            vec!["right".to_string(), "wrong".to_string()],
            "right",
        )
        .unwrap()
    }

    fn build_session(len: usize) -> ExamSession {
        let questions = (0..len).map(build_question).collect();
        ExamSession::new(ExamConfiguration::for_category("b"), questions, fixed_now()).unwrap()
    }

    fn ids(session: &ExamSession) -> Vec<String> {
        session
            .questions()
            .iter()
            .map(|q| q.id().to_string())
            .collect()
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let err = ExamSession::new(ExamConfiguration::for_category("b"), Vec::new(), fixed_now())
            .unwrap_err();
        assert_eq!(err, ExamError::NoQuestions);
    }

    #[test]
    fn answers_update_counters_and_freeze_slot() {
        let mut session = build_session(30);

        assert_eq!(session.submit_answer("right"), AnswerOutcome::Correct);
        assert_eq!(session.submit_answer("wrong"), AnswerOutcome::Ignored);
        assert_eq!(session.correct_count(), 1);
        assert_eq!(session.wrong_count(), 0);

        session.go_next();
        assert_eq!(session.submit_answer("wrong"), AnswerOutcome::Wrong);
        assert_eq!(session.correct_count() + session.wrong_count(), session.answered_count());
    }

    #[test]
    fn wrong_answer_budget_ends_exam_early() {
        let mut session = build_session(30);

        for expected in [AnswerOutcome::Wrong, AnswerOutcome::Wrong, AnswerOutcome::Wrong] {
            assert_eq!(session.submit_answer("wrong"), expected);
            session.go_next();
        }
        assert_eq!(session.submit_answer("wrong"), AnswerOutcome::BudgetExhausted);

        assert_eq!(session.phase(), ExamPhase::CompletedFailed);
        assert_eq!(session.failure_reason(), Some(FailureReason::WrongAnswerBudget));
        assert_eq!(session.answered_count(), 4);

        // Anything after the verdict is ignored, including a fifth wrong answer.
        assert!(!session.go_next());
        assert_eq!(session.submit_answer("wrong"), AnswerOutcome::Ignored);
        assert_eq!(session.wrong_count(), 4);
        assert_eq!(session.phase(), ExamPhase::CompletedFailed);
    }

    #[test]
    fn two_question_exam_fails_on_first_wrong_answer() {
        let questions = vec![
            Question::new(QuestionId::new("1"), "first", None, vec!["A".into(), "B".into()], "A")
                .unwrap(),
            Question::new(QuestionId::new("2"), "second", None, vec!["X".into(), "Y".into()], "X")
                .unwrap(),
        ];
        let mut session =
            ExamSession::new(ExamConfiguration::for_category("b"), questions, fixed_now()).unwrap();

        assert_eq!(session.max_wrong_allowed(), 0);
        assert_eq!(session.submit_answer("B"), AnswerOutcome::BudgetExhausted);
        assert_eq!(session.phase(), ExamPhase::CompletedFailed);

        assert!(!session.go_next());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.submit_answer("X"), AnswerOutcome::Ignored);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.wrong_count(), 1);
    }

    #[test]
    fn finishing_all_questions_computes_verdict() {
        let mut session = build_session(30);
        for i in 0..30 {
            let option = if i < 3 { "wrong" } else { "right" };
            session.submit_answer(option);
            assert!(session.go_next());
        }
        assert_eq!(session.phase(), ExamPhase::CompletedPassed);
        assert_eq!(session.termination_reason(), Some(TerminationReason::Passed));
        assert_eq!(session.correct_count(), 27);
    }

    #[test]
    fn last_answer_can_exhaust_budget() {
        let mut session = build_session(9);
        assert_eq!(session.max_wrong_allowed(), 1);
        for _ in 0..8 {
            session.submit_answer("right");
            session.go_next();
        }
        assert_eq!(session.submit_answer("wrong"), AnswerOutcome::BudgetExhausted);
        assert_eq!(session.termination_reason(), Some(TerminationReason::WrongAnswerBudget));
    }

    #[test]
    fn go_next_at_last_index_waits_for_all_answers() {
        let mut session = build_session(3);
        assert!(session.go_to(2));
        session.submit_answer("right");
        assert!(!session.go_next());
        assert!(session.is_in_progress());
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn go_prev_stops_at_zero() {
        let mut session = build_session(3);
        assert!(!session.go_prev());
        session.go_next();
        assert!(session.go_prev());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn terminate_is_terminal() {
        let mut session = build_session(3);
        assert!(session.terminate());
        assert_eq!(session.phase(), ExamPhase::TerminatedByUser);
        assert!(!session.terminate());
        assert_eq!(session.submit_answer("right"), AnswerOutcome::Ignored);
        assert!(!session.defer_current());
        assert_eq!(session.termination_reason(), Some(TerminationReason::TerminatedByUser));
    }

    #[test]
    fn countdown_expiry_fails_exam_once() {
        let mut session = build_session(30);
        session.submit_answer("right");
        let budget = session.time_remaining();
        assert_eq!(budget, 1800);

        for _ in 0..budget - 1 {
            assert!(matches!(session.tick(), TickOutcome::Ticked { .. }));
        }
        assert_eq!(session.tick(), TickOutcome::Expired);
        assert_eq!(session.phase(), ExamPhase::CompletedFailed);
        assert_eq!(session.failure_reason(), Some(FailureReason::TimeExpired));
        assert_eq!(session.time_remaining(), 0);

        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), 0);
        assert_eq!(session.failure_reason(), Some(FailureReason::TimeExpired));
    }

    #[test]
    fn ticks_stop_after_other_terminal_transitions() {
        let mut session = build_session(3);
        session.tick();
        session.terminate();
        let remaining = session.time_remaining();
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), remaining);
    }

    #[test]
    fn restart_same_questions_keeps_order() {
        let mut session = build_session(5);
        session.go_to(3);
        session.defer_current();
        session.settle_reorder();
        session.submit_answer("wrong");
        session.tick();
        session.terminate();
        let before = ids(&session);

        session.restart_same_questions(fixed_now());

        assert_eq!(ids(&session), before);
        assert!(session.answers().iter().all(Option::is_none));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.wrong_count(), 0);
        assert_eq!(session.time_remaining(), 1800);
        assert_eq!(session.phase(), ExamPhase::InProgress);
        assert_eq!(session.failure_reason(), None);
    }

    #[test]
    fn defer_moves_question_with_its_answer() {
        let mut session = build_session(4);
        session.submit_answer("right");
        assert!(session.go_to(1));
        let next_id = session.questions()[2].id().clone();

        assert!(session.defer_current());

        assert_eq!(session.current_index(), 1);
        assert_eq!(session.current_question().unwrap().id(), &next_id);
        assert_eq!(session.questions().len(), session.answers().len());
        assert_eq!(ids(&session), vec!["q0", "q2", "q3", "q1"]);
        assert_eq!(session.answers()[0].as_deref(), Some("right"));
    }

    #[test]
    fn defer_at_last_index_wraps_to_start() {
        let mut session = build_session(3);
        session.go_to(2);
        let before = ids(&session);

        assert!(session.defer_current());

        assert_eq!(ids(&session), before);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn reorder_lock_blocks_answers_and_second_defer() {
        let mut session = build_session(3);
        assert!(session.defer_current());
        assert!(session.is_reorder_locked());

        assert!(!session.defer_current());
        assert_eq!(session.submit_answer("right"), AnswerOutcome::Ignored);

        assert!(session.settle_reorder());
        assert!(!session.settle_reorder());
        assert_eq!(session.submit_answer("right"), AnswerOutcome::Correct);
    }

    #[test]
    fn auto_advance_is_pending_until_completed() {
        let mut session = build_session(3).with_auto_advance(true);

        session.submit_answer("right");
        assert!(session.has_pending_advance());
        assert_eq!(session.current_index(), 0);

        assert!(session.complete_auto_advance());
        assert_eq!(session.current_index(), 1);
        assert!(!session.complete_auto_advance());
    }

    #[test]
    fn auto_advance_dropped_when_user_navigates_or_at_last() {
        let mut session = build_session(3).with_auto_advance(true);
        session.submit_answer("right");
        session.go_next();
        assert!(!session.complete_auto_advance());
        assert_eq!(session.current_index(), 1);

        session.go_to(2);
        session.submit_answer("right");
        assert!(!session.has_pending_advance());
    }

    #[test]
    fn auto_advance_not_scheduled_after_failure() {
        let mut session = build_session(2).with_auto_advance(true);
        assert_eq!(session.submit_answer("wrong"), AnswerOutcome::BudgetExhausted);
        assert!(!session.has_pending_advance());
    }

    #[test]
    fn progress_marks_and_review() {
        let mut session = build_session(30);
        session.submit_answer("right");
        session.go_next();
        session.submit_answer("wrong");
        session.go_next();

        assert_eq!(
            session.progress_marks()[..4],
            [
                ProgressMark::Correct,
                ProgressMark::Wrong,
                ProgressMark::Current,
                ProgressMark::Unanswered
            ]
        );

        let review = session.review(1).unwrap();
        assert!(!review.is_correct);
        assert_eq!(review.user_answer, "wrong");
        assert_eq!(review.correct_answer(), "right");
        assert!(session.review(2).is_none());
        assert!(session.review(99).is_none());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = build_session(30);
        session.submit_answer("right");
        session.tick();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.position(), 1);
        assert_eq!(snapshot.total, 30);
        assert_eq!(snapshot.correct, 1);
        assert_eq!(snapshot.max_wrong_allowed, 4);
        assert_eq!(snapshot.time_remaining_secs, 1799);
        assert_eq!(snapshot.current_answer.as_deref(), Some("right"));
        assert!(!snapshot.is_finished());
    }

    #[test]
    fn outcome_only_after_terminal_phase() {
        let mut session = build_session(3);
        assert!(session.outcome(fixed_now()).is_none());

        session.tick();
        session.terminate();
        let outcome = session.outcome(fixed_now()).unwrap();
        assert_eq!(outcome.reason(), TerminationReason::TerminatedByUser);
        assert_eq!(outcome.time_used_secs(), 1);
        assert_eq!(outcome.total_questions(), 3);
    }
}
