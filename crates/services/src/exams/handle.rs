use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::debug;

use drift_core::Clock;
use drift_core::exam::{
    AnswerOutcome, ExamSession, ExamSnapshot, ProgressMark, QuestionReview, TickOutcome,
};
use drift_core::model::ExamOutcome;

use super::countdown::CountdownHandle;
use super::workflow::ExamSelection;
use crate::results::ResultsSink;

/// Timing of the background activity around a running exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamTiming {
    /// Countdown period.
    pub tick: Duration,
    /// Delay before an auto-advancing answer moves to the next question.
    pub auto_advance_delay: Duration,
    /// How long a deferred question keeps answers and reorders locked.
    pub reorder_settle: Duration,
}

impl Default for ExamTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            auto_advance_delay: Duration::from_millis(500),
            reorder_settle: Duration::from_millis(1000),
        }
    }
}

struct Slot {
    session: ExamSession,
    // Bumped on restart so delayed tasks from an earlier attempt do nothing.
    attempt: u64,
    reported: bool,
}

struct Finished {
    outcome: ExamOutcome,
    attempt: u64,
}

struct Shared {
    slot: Mutex<Slot>,
    countdown: Mutex<Option<CountdownHandle>>,
    sink: Arc<dyn ResultsSink>,
    clock: Clock,
    timing: ExamTiming,
    selection: ExamSelection,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running exam: the session plus its countdown and delayed follow-ups.
///
/// Commands are applied one at a time under a lock. When a command or tick
/// ends the exam, the countdown is cancelled and the outcome is sent to the
/// results sink once.
#[derive(Clone)]
pub struct ExamHandle {
    shared: Arc<Shared>,
}

impl ExamHandle {
    pub(crate) fn start(
        session: ExamSession,
        selection: ExamSelection,
        sink: Arc<dyn ResultsSink>,
        clock: Clock,
        timing: ExamTiming,
    ) -> Self {
        let handle = Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    session,
                    attempt: 0,
                    reported: false,
                }),
                countdown: Mutex::new(None),
                sink,
                clock,
                timing,
                selection,
            }),
        };
        handle.start_countdown(0);
        handle
    }

    #[must_use]
    pub fn selection(&self) -> &ExamSelection {
        &self.shared.selection
    }

    /// Run a read-only closure against the current session.
    pub fn read<T>(&self, f: impl FnOnce(&ExamSession) -> T) -> T {
        f(&lock(&self.shared.slot).session)
    }

    #[must_use]
    pub fn snapshot(&self) -> ExamSnapshot {
        self.read(ExamSession::snapshot)
    }

    #[must_use]
    pub fn progress_marks(&self) -> Vec<ProgressMark> {
        self.read(ExamSession::progress_marks)
    }

    #[must_use]
    pub fn review(&self, index: usize) -> Option<QuestionReview> {
        self.read(|session| session.review(index))
    }

    #[must_use]
    pub fn countdown_running(&self) -> bool {
        lock(&self.shared.countdown)
            .as_ref()
            .is_some_and(|countdown| !countdown.is_finished())
    }

    pub async fn submit_answer(&self, option: &str) -> AnswerOutcome {
        let (outcome, attempt, pending, finished) = {
            let mut slot = lock(&self.shared.slot);
            let outcome = slot.session.submit_answer(option);
            let pending = slot.session.has_pending_advance();
            let finished = Self::take_outcome(&self.shared, &mut slot);
            (outcome, slot.attempt, pending, finished)
        };

        if pending {
            self.schedule(
                self.shared.timing.auto_advance_delay,
                attempt,
                ExamSession::complete_auto_advance,
            );
        }
        self.report(finished).await;
        outcome
    }

    pub async fn go_next(&self) -> bool {
        self.apply(ExamSession::go_next).await
    }

    pub async fn go_prev(&self) -> bool {
        self.apply(ExamSession::go_prev).await
    }

    pub async fn go_to(&self, index: usize) -> bool {
        self.apply(|session| session.go_to(index)).await
    }

    pub async fn terminate(&self) -> bool {
        self.apply(ExamSession::terminate).await
    }

    /// Defer the current question to the end. The reorder lock is released
    /// after `ExamTiming::reorder_settle`.
    pub fn defer_current(&self) -> bool {
        let (moved, attempt) = {
            let mut slot = lock(&self.shared.slot);
            (slot.session.defer_current(), slot.attempt)
        };
        if moved {
            self.schedule(
                self.shared.timing.reorder_settle,
                attempt,
                ExamSession::settle_reorder,
            );
        }
        moved
    }

    pub fn set_auto_advance(&self, enabled: bool) {
        lock(&self.shared.slot).session.set_auto_advance(enabled);
    }

    /// Retake the exam with the same questions; the countdown starts over.
    pub fn restart_same_questions(&self) {
        let mut slot = lock(&self.shared.slot);
        slot.session.restart_same_questions(self.shared.clock.now());
        slot.attempt += 1;
        slot.reported = false;
        // Slot lock is held while the countdown is swapped; `report` checks the
        // attempt under the same lock.
        self.start_countdown(slot.attempt);
    }

    /// Stop background activity. The session stays readable.
    pub fn close(&self) {
        self.stop_countdown();
    }

    pub(crate) async fn tick(&self, attempt: u64) -> TickOutcome {
        let (outcome, finished) = {
            let mut slot = lock(&self.shared.slot);
            if slot.attempt != attempt {
                return TickOutcome::Ignored;
            }
            let outcome = slot.session.tick();
            (outcome, Self::take_outcome(&self.shared, &mut slot))
        };
        self.report(finished).await;
        outcome
    }

    async fn apply(&self, f: impl FnOnce(&mut ExamSession) -> bool) -> bool {
        let (changed, finished) = {
            let mut slot = lock(&self.shared.slot);
            let changed = f(&mut slot.session);
            (changed, Self::take_outcome(&self.shared, &mut slot))
        };
        self.report(finished).await;
        changed
    }

    fn take_outcome(shared: &Shared, slot: &mut Slot) -> Option<Finished> {
        if slot.reported || slot.session.is_in_progress() {
            return None;
        }
        slot.reported = true;
        let outcome = slot.session.outcome(shared.clock.now())?;
        Some(Finished {
            outcome,
            attempt: slot.attempt,
        })
    }

    async fn report(&self, finished: Option<Finished>) {
        let Some(Finished { outcome, attempt }) = finished else {
            return;
        };
        {
            let slot = lock(&self.shared.slot);
            if slot.attempt == attempt {
                self.stop_countdown();
            } else {
                debug!(attempt, current = slot.attempt, "exam restarted before report");
            }
        }
        self.shared.sink.record(&outcome).await;
    }

    fn schedule(&self, delay: Duration, attempt: u64, f: fn(&mut ExamSession) -> bool) {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut slot = lock(&shared.slot);
            if slot.attempt == attempt {
                let applied = f(&mut slot.session);
                debug!(applied, "delayed exam update");
            }
        });
    }

    fn start_countdown(&self, attempt: u64) {
        let weak = Arc::downgrade(&self.shared);
        let countdown = CountdownHandle::spawn(self.shared.timing.tick, move || {
            let weak = weak.clone();
            async move {
                let Some(shared) = weak.upgrade() else {
                    return false;
                };
                let handle = ExamHandle { shared };
                matches!(handle.tick(attempt).await, TickOutcome::Ticked { .. })
            }
        });
        if let Some(previous) = lock(&self.shared.countdown).replace(countdown) {
            previous.cancel();
        }
    }

    fn stop_countdown(&self) {
        if let Some(countdown) = lock(&self.shared.countdown).take() {
            countdown.cancel();
        }
    }
}

impl fmt::Debug for ExamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.shared.slot);
        f.debug_struct("ExamHandle")
            .field("session", &slot.session)
            .field("attempt", &slot.attempt)
            .field("reported", &slot.reported)
            .finish_non_exhaustive()
    }
}
