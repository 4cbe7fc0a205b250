use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("vehicle name cannot be empty")]
    EmptyVehicleName,
}

/// Question count for categories C and D (trucks and buses).
pub const HEAVY_QUESTION_COUNT: usize = 40;
/// Question count for every other category.
pub const STANDARD_QUESTION_COUNT: usize = 30;
/// Time budget for the 40-question exam.
pub const HEAVY_TIME_BUDGET_SECS: u32 = 2400;
/// Time budget for the 30-question exam.
pub const STANDARD_TIME_BUDGET_SECS: u32 = 1800;

/// Exam shape derived once from the selected vehicle, before sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamConfiguration {
    category: String,
    question_count: usize,
    time_budget_secs: u32,
}

impl ExamConfiguration {
    /// Derive the configuration from a vehicle display name such as
    /// `"C1 Truck"` or `"B Car"`.
    ///
    /// The category tag is the first whitespace-separated token, lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::EmptyVehicleName` if the name has no tokens.
    pub fn from_vehicle_name(name: &str) -> Result<Self, ConfigurationError> {
        let category = name
            .split_whitespace()
            .next()
            .ok_or(ConfigurationError::EmptyVehicleName)?
            .to_lowercase();
        Ok(Self::for_category(category))
    }

    /// Build the configuration for an already-derived category tag.
    #[must_use]
    pub fn for_category(category: impl Into<String>) -> Self {
        let category = category.into().to_lowercase();
        let heavy = category.contains('c') || category.contains('d');
        let (question_count, time_budget_secs) = if heavy {
            (HEAVY_QUESTION_COUNT, HEAVY_TIME_BUDGET_SECS)
        } else {
            (STANDARD_QUESTION_COUNT, STANDARD_TIME_BUDGET_SECS)
        };

        Self {
            category,
            question_count,
            time_budget_secs,
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavy_categories_get_forty_questions() {
        for name in ["C Truck", "c1 truck", "D bus", "CE trailer", "D1"] {
            let config = ExamConfiguration::from_vehicle_name(name).unwrap();
            assert_eq!(config.question_count(), 40, "{name}");
            assert_eq!(config.time_budget_secs(), 2400, "{name}");
        }
    }

    #[test]
    fn other_categories_get_thirty_questions() {
        let config = ExamConfiguration::from_vehicle_name("B Automobile").unwrap();
        assert_eq!(config.category(), "b");
        assert_eq!(config.question_count(), 30);
        assert_eq!(config.time_budget_secs(), 1800);
    }

    #[test]
    fn only_first_token_decides() {
        let config = ExamConfiguration::from_vehicle_name("A1 Moped Cd").unwrap();
        assert_eq!(config.category(), "a1");
        assert_eq!(config.question_count(), 30);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = ExamConfiguration::from_vehicle_name("   ").unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyVehicleName);
    }
}
