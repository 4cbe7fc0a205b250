//! Shared error types for the services crate.

use thiserror::Error;

use drift_core::exam::ExamError;
use drift_core::model::{ConfigurationError, VehicleId};

/// Errors surfaced by question bank and vehicle catalog adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("no questions match the selected vehicle and topics")]
    EmptyResult,
    #[error("unknown vehicle: {0}")]
    UnknownVehicle(VehicleId),
    #[error("question bank request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("question bank unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("question bank unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while starting or restarting an exam.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamServiceError {
    #[error("select at least one topic before starting the exam")]
    NoTopicsSelected,
    #[error(transparent)]
    Sampling(#[from] QuestionBankError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Exam(#[from] ExamError),
}

impl ExamServiceError {
    /// Blocking message shown when no exam can start.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoTopicsSelected => "Please select at least one topic before starting the exam.",
            Self::Sampling(QuestionBankError::EmptyResult) | Self::Exam(ExamError::NoQuestions) => {
                "No questions found in the database."
            }
            Self::Sampling(_) | Self::Configuration(_) | Self::Exam(_) => {
                "Failed to fetch questions."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_distinguish_empty_from_failure() {
        let empty = ExamServiceError::from(QuestionBankError::EmptyResult);
        assert_eq!(empty.user_message(), "No questions found in the database.");

        let down = ExamServiceError::from(QuestionBankError::Unavailable("down".into()));
        assert_eq!(down.user_message(), "Failed to fetch questions.");

        let unknown = ExamServiceError::from(QuestionBankError::UnknownVehicle(VehicleId::new("v")));
        assert_eq!(unknown.user_message(), "Failed to fetch questions.");
    }
}
