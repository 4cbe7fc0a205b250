//! Pass/fail rules for a driving theory exam.
//!
//! The 40- and 30-question exams have fixed wrong-answer budgets. Any other
//! size (a short question bank) falls back to 12.5% of the total, rounded down.

use crate::model::{HEAVY_QUESTION_COUNT, STANDARD_QUESTION_COUNT};

/// Wrong answers allowed on the 40-question exam.
pub const HEAVY_MAX_WRONG: usize = 5;
/// Wrong answers allowed on the 30-question exam. More lenient than 12.5% of 30.
pub const STANDARD_MAX_WRONG: usize = 4;

/// Maximum number of wrong answers that still passes an exam of `total` questions.
#[must_use]
pub fn max_wrong_allowed(total: usize) -> usize {
    match total {
        HEAVY_QUESTION_COUNT => HEAVY_MAX_WRONG,
        STANDARD_QUESTION_COUNT => STANDARD_MAX_WRONG,
        // floor(total * 0.125) without going through floats.
        _ => total / 8,
    }
}

/// Verdict for a fully answered exam.
#[must_use]
pub fn is_passing(total: usize, correct: usize) -> bool {
    let wrong = total.saturating_sub(correct);
    wrong <= max_wrong_allowed(total)
}

/// True once `wrong` answers have used up the budget and the exam must stop.
#[must_use]
pub fn budget_exhausted(total: usize, wrong: usize) -> bool {
    wrong >= max_wrong_allowed(total)
}
