use std::env;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use drift_core::model::{Question, QuestionId, TopicId, VehicleId};

use super::{QuestionBank, VehicleCatalog};
use crate::error::QuestionBankError;

const DEFAULT_BASE_URL: &str = "https://avtoskola-drift.vercel.app/api";

#[derive(Clone, Debug)]
pub struct QuestionBankConfig {
    pub base_url: String,
}

impl QuestionBankConfig {
    /// Reads `DRIFT_API_BASE_URL`, falling back to the public API.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("DRIFT_API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self { base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for QuestionBankConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

/// Question bank and vehicle catalog backed by the school's REST API.
///
/// The API has no server-side filter, so every question is downloaded and
/// filtered by vehicle and topic here.
#[derive(Clone)]
pub struct HttpQuestionBank {
    client: Client,
    config: QuestionBankConfig,
}

impl HttpQuestionBank {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuestionBankConfig::from_env())
    }

    #[must_use]
    pub fn new(config: QuestionBankConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuestionBankConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, QuestionBankError> {
        debug!(%url, "question bank request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(QuestionBankError::HttpStatus(status));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuestionBank for HttpQuestionBank {
    async fn fetch_candidates(
        &self,
        vehicle: &VehicleId,
        topics: &[TopicId],
    ) -> Result<Vec<Question>, QuestionBankError> {
        let all: Vec<QuestionDto> = self.get_json(self.config.endpoint("questions")).await?;
        let total = all.len();
        let found = filter_questions(all, vehicle, topics);
        debug!(total, matched = found.len(), "questions filtered");
        if found.is_empty() {
            return Err(QuestionBankError::EmptyResult);
        }
        Ok(found)
    }
}

#[async_trait]
impl VehicleCatalog for HttpQuestionBank {
    async fn vehicle_name(&self, vehicle: &VehicleId) -> Result<String, QuestionBankError> {
        let url = self.config.endpoint(&format!("vehicles/{vehicle}"));
        match self.get_json::<VehicleDto>(url).await {
            Ok(dto) => Ok(dto.name),
            Err(QuestionBankError::HttpStatus(StatusCode::NOT_FOUND)) => {
                Err(QuestionBankError::UnknownVehicle(vehicle.clone()))
            }
            Err(err) => Err(err),
        }
    }
}

fn filter_questions(all: Vec<QuestionDto>, vehicle: &VehicleId, topics: &[TopicId]) -> Vec<Question> {
    all.into_iter()
        .filter(|dto| {
            dto.vehicles.iter().any(|v| v.id == *vehicle)
                && dto.topic.as_ref().is_some_and(|t| topics.contains(&t.id))
        })
        .filter_map(|dto| {
            let id = dto.id.clone();
            match dto.into_question() {
                Ok(question) => Some(question),
                Err(err) => {
                    warn!(question = %id, error = %err, "skipping invalid question");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RefDto<T> {
    #[serde(rename = "_id")]
    id: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    #[serde(rename = "_id")]
    id: QuestionId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    vehicles: Vec<RefDto<VehicleId>>,
    #[serde(default)]
    topic: Option<RefDto<TopicId>>,
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, drift_core::model::QuestionError> {
        let image = self
            .photo
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match url::Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(question = %self.id, photo = %raw, error = %err, "ignoring bad photo url");
                    None
                }
            });
        Question::new(self.id, self.title, image, self.options, self.correct_answer)
    }
}

#[derive(Debug, Deserialize)]
struct VehicleDto {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"_id": "q1", "title": "Stop sign", "photo": "https://cdn.example.com/stop.png",
         "options": ["Stop", "Go"], "correctAnswer": "Stop",
         "vehicles": [{"_id": "car", "name": "B Car"}], "topic": {"_id": "signs"}},
        {"_id": "q2", "title": "Truck weight", "options": ["3.5t", "7.5t"], "correctAnswer": "7.5t",
         "vehicles": [{"_id": "truck"}], "topic": {"_id": "signs"}},
        {"_id": "q3", "title": "Broken", "options": ["a"], "correctAnswer": "b",
         "vehicles": [{"_id": "car"}], "topic": {"_id": "signs"}},
        {"_id": "q4", "title": "Right of way", "photo": "", "options": ["Left", "Right"],
         "correctAnswer": "Right", "vehicles": [{"_id": "car"}], "topic": {"_id": "rules"}}
    ]"#;

    #[test]
    fn filters_and_skips_invalid_questions() {
        let all: Vec<QuestionDto> = serde_json::from_str(SAMPLE).unwrap();
        let found = filter_questions(all, &VehicleId::new("car"), &[TopicId::new("signs")]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "q1");
        assert_eq!(found[0].correct_answer(), "Stop");
        assert!(found[0].image().is_some());
    }

    #[test]
    fn empty_photo_means_no_image() {
        let all: Vec<QuestionDto> = serde_json::from_str(SAMPLE).unwrap();
        let found = filter_questions(all, &VehicleId::new("car"), &[TopicId::new("rules")]);
        assert_eq!(found.len(), 1);
        assert!(found[0].image().is_none());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = QuestionBankConfig {
            base_url: "http://localhost:3000/api/".into(),
        };
        assert_eq!(config.endpoint("questions"), "http://localhost:3000/api/questions");
    }
}
