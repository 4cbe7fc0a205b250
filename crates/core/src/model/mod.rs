mod config;
mod ids;
mod outcome;
mod question;

pub use ids::{ParseIdError, QuestionId, TopicId, VehicleId};

pub use config::{
    ConfigurationError, ExamConfiguration, HEAVY_QUESTION_COUNT, HEAVY_TIME_BUDGET_SECS,
    STANDARD_QUESTION_COUNT, STANDARD_TIME_BUDGET_SECS,
};
pub use outcome::{ExamOutcome, ExamOutcomeError, TerminationReason, Verdict};
pub use question::{Question, QuestionError};
