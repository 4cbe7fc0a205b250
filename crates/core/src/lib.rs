#![forbid(unsafe_code)]

pub mod exam;
pub mod model;
pub mod sampler;
pub mod scoring;
pub mod time;

pub use exam::{ExamPhase, ExamSession, ExamSnapshot, FailureReason};
pub use time::Clock;
