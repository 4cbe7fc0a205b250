use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use drift_core::exam::ExamSession;
use drift_core::model::{ExamConfiguration, TopicId, VehicleId};
use drift_core::sampler;

use super::handle::{ExamHandle, ExamTiming};
use crate::Clock;
use crate::bank::{QuestionBank, VehicleCatalog};
use crate::error::ExamServiceError;
use crate::results::ResultsSink;

/// Vehicle and topics picked before starting an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSelection {
    pub vehicle: VehicleId,
    pub topics: Vec<TopicId>,
}

impl ExamSelection {
    #[must_use]
    pub fn new(vehicle: VehicleId, topics: impl IntoIterator<Item = TopicId>) -> Self {
        Self {
            vehicle,
            topics: topics.into_iter().collect(),
        }
    }
}

/// Orchestrates exam start and restarts against the external collaborators.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    bank: Arc<dyn QuestionBank>,
    vehicles: Arc<dyn VehicleCatalog>,
    sink: Arc<dyn ResultsSink>,
    timing: ExamTiming,
    auto_advance: bool,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<dyn QuestionBank>,
        vehicles: Arc<dyn VehicleCatalog>,
        sink: Arc<dyn ResultsSink>,
    ) -> Self {
        Self {
            clock,
            bank,
            vehicles,
            sink,
            timing: ExamTiming::default(),
            auto_advance: false,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: ExamTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// Resolve the exam shape for a vehicle from its display name.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` if the vehicle is unknown or has an empty name.
    pub async fn resolve_configuration(
        &self,
        vehicle: &VehicleId,
    ) -> Result<ExamConfiguration, ExamServiceError> {
        let name = self.vehicles.vehicle_name(vehicle).await?;
        let config = ExamConfiguration::from_vehicle_name(&name)?;
        info!(
            %vehicle,
            category = config.category(),
            questions = config.question_count(),
            "exam configuration resolved"
        );
        Ok(config)
    }

    /// Resolve the configuration, fetch candidates, and sample a fresh session.
    ///
    /// Configuration is resolved before any questions are fetched so that
    /// exactly `question_count` questions are drawn.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` if no topics are selected, the vehicle
    /// cannot be resolved, or the question bank fails or returns nothing.
    pub async fn prepare_session<R: Rng + ?Sized>(
        &self,
        selection: &ExamSelection,
        rng: &mut R,
    ) -> Result<ExamSession, ExamServiceError> {
        if selection.topics.is_empty() {
            return Err(ExamServiceError::NoTopicsSelected);
        }

        let config = self.resolve_configuration(&selection.vehicle).await?;
        let candidates = self
            .bank
            .fetch_candidates(&selection.vehicle, &selection.topics)
            .await?;
        let available = candidates.len();
        let questions = sampler::sample(candidates, config.question_count(), rng);
        info!(available, drawn = questions.len(), "exam questions sampled");

        let session = ExamSession::new(config, questions, self.clock.now())?
            .with_auto_advance(self.auto_advance);
        Ok(session)
    }

    /// Start an exam with a freshly seeded random source.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` when sampling fails; no session is created.
    pub async fn start_exam(&self, selection: ExamSelection) -> Result<ExamHandle, ExamServiceError> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.start_exam_with_rng(selection, &mut rng).await
    }

    /// Start an exam using the caller's random source.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` when sampling fails; no session is created.
    pub async fn start_exam_with_rng<R: Rng + ?Sized>(
        &self,
        selection: ExamSelection,
        rng: &mut R,
    ) -> Result<ExamHandle, ExamServiceError> {
        let session = self.prepare_session(&selection, rng).await?;
        Ok(ExamHandle::start(
            session,
            selection,
            Arc::clone(&self.sink),
            self.clock,
            self.timing,
        ))
    }

    /// Discard the running exam and draw a new question set for the same selection.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` when sampling fails. The previous exam is
    /// already closed at that point.
    pub async fn restart_new_questions(
        &self,
        previous: ExamHandle,
    ) -> Result<ExamHandle, ExamServiceError> {
        previous.close();
        let selection = previous.selection().clone();
        drop(previous);
        self.start_exam(selection).await
    }
}
