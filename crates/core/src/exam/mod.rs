mod progress;
pub mod reorder;
mod session;

pub use progress::{ExamSnapshot, ProgressMark, QuestionReview};
pub use reorder::defer_to_end;
pub use session::{AnswerOutcome, ExamError, ExamPhase, ExamSession, FailureReason, TickOutcome};
