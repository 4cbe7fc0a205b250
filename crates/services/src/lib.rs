#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod exams;
pub mod results;

pub use drift_core::Clock;

pub use bank::{HttpQuestionBank, InMemoryQuestionBank, QuestionBank, QuestionBankConfig, VehicleCatalog};
pub use error::{ExamServiceError, QuestionBankError};
pub use exams::{CountdownHandle, ExamHandle, ExamLoopService, ExamSelection, ExamTiming};
pub use results::{InMemoryResultsSink, ResultsSink, TracingResultsSink};
