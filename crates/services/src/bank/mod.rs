mod http;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use drift_core::model::{Question, QuestionId, TopicId, VehicleId};

use crate::error::QuestionBankError;

pub use http::{HttpQuestionBank, QuestionBankConfig};

/// Source of exam candidates.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Fetch every question tagged with `vehicle` whose topic is in `topics`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::EmptyResult` if nothing matches, or a
    /// transport error if the bank cannot be reached.
    async fn fetch_candidates(
        &self,
        vehicle: &VehicleId,
        topics: &[TopicId],
    ) -> Result<Vec<Question>, QuestionBankError>;
}

/// Lookup of vehicle display names, from which the exam category is derived.
#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns `QuestionBankError::UnknownVehicle` if the id is not known.
    async fn vehicle_name(&self, vehicle: &VehicleId) -> Result<String, QuestionBankError>;
}

#[derive(Debug, Clone)]
struct TaggedQuestion {
    question: Question,
    topic: TopicId,
    vehicles: HashSet<VehicleId>,
}

/// In-memory question bank and vehicle catalog for tests and offline runs.
#[derive(Clone, Default)]
pub struct InMemoryQuestionBank {
    vehicles: Arc<Mutex<HashMap<VehicleId, String>>>,
    questions: Arc<Mutex<Vec<TaggedQuestion>>>,
}

impl InMemoryQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or rename a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Unavailable` if the lock is poisoned.
    pub fn upsert_vehicle(
        &self,
        id: VehicleId,
        name: impl Into<String>,
    ) -> Result<(), QuestionBankError> {
        let mut guard = self
            .vehicles
            .lock()
            .map_err(|e| QuestionBankError::Unavailable(e.to_string()))?;
        guard.insert(id, name.into());
        Ok(())
    }

    /// Add a question under one topic for the given vehicles, replacing any
    /// question with the same id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Unavailable` if the lock is poisoned.
    pub fn upsert_question(
        &self,
        question: Question,
        topic: TopicId,
        vehicles: impl IntoIterator<Item = VehicleId>,
    ) -> Result<(), QuestionBankError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| QuestionBankError::Unavailable(e.to_string()))?;
        guard.retain(|tagged| tagged.question.id() != question.id());
        guard.push(TaggedQuestion {
            question,
            topic,
            vehicles: vehicles.into_iter().collect(),
        });
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Unavailable` if the lock is poisoned.
    pub fn remove_question(&self, id: &QuestionId) -> Result<bool, QuestionBankError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| QuestionBankError::Unavailable(e.to_string()))?;
        let before = guard.len();
        guard.retain(|tagged| tagged.question.id() != id);
        Ok(guard.len() != before)
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionBank {
    async fn fetch_candidates(
        &self,
        vehicle: &VehicleId,
        topics: &[TopicId],
    ) -> Result<Vec<Question>, QuestionBankError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| QuestionBankError::Unavailable(e.to_string()))?;
        let found: Vec<Question> = guard
            .iter()
            .filter(|tagged| tagged.vehicles.contains(vehicle) && topics.contains(&tagged.topic))
            .map(|tagged| tagged.question.clone())
            .collect();
        if found.is_empty() {
            return Err(QuestionBankError::EmptyResult);
        }
        Ok(found)
    }
}

#[async_trait]
impl VehicleCatalog for InMemoryQuestionBank {
    async fn vehicle_name(&self, vehicle: &VehicleId) -> Result<String, QuestionBankError> {
        let guard = self
            .vehicles
            .lock()
            .map_err(|e| QuestionBankError::Unavailable(e.to_string()))?;
        guard
            .get(vehicle)
            .cloned()
            .ok_or_else(|| QuestionBankError::UnknownVehicle(vehicle.clone()))
    }
}
