//! Client for the external grade prediction service.
//!
//! Every call is a single JSON exchange: no retries, no timeout, no caching.
//! Failures of any kind come back as [`ApiError`].

use crate::error::{ApiError, GENERIC_MESSAGE};
use crate::record::StudentRecord;
use awc::http::{header, StatusCode};
use awc::{Client, SendClientRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const BODY_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfidence {
    pub r2_score: Option<f64>,
    pub mae: Option<f64>,
}

/// Predicted final grade for one student.
///
/// Decodes from either `predicted_grade` or the service's `prediction` field,
/// preferring `predicted_grade` when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct PredictionResult {
    pub predicted_grade: f64,
    pub confidence: Option<ModelConfidence>,
}

#[derive(Deserialize)]
struct RawPrediction {
    predicted_grade: Option<f64>,
    prediction: Option<f64>,
    confidence: Option<ModelConfidence>,
}

impl TryFrom<RawPrediction> for PredictionResult {
    type Error = String;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        let grade = raw
            .predicted_grade
            .or(raw.prediction)
            .ok_or_else(|| "response has no predicted grade".to_string())?;
        PredictionResult::new(grade, raw.confidence)
    }
}

impl PredictionResult {
    pub const MAX_GRADE: f64 = 20.0;

    pub fn new(predicted_grade: f64, confidence: Option<ModelConfidence>) -> Result<Self, String> {
        if !(0.0..=Self::MAX_GRADE).contains(&predicted_grade) {
            return Err(format!("predicted grade {predicted_grade} is outside 0-20"));
        }
        Ok(Self {
            predicted_grade,
            confidence,
        })
    }

    pub fn r2_score(&self) -> Option<f64> {
        self.confidence.and_then(|c| c.r2_score)
    }

    pub fn mae(&self) -> Option<f64> {
        self.confidence.and_then(|c| c.mae)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBin {
    pub range: String,
    pub count: u64,
}

/// Aggregate description of the prediction model, as served by `/metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub r2_score: Option<f64>,
    pub mae: Option<f64>,
    #[serde(default, alias = "feature_names")]
    pub features: Vec<String>,
    #[serde(default)]
    pub categorical_features: Vec<String>,
    #[serde(default)]
    pub numerical_features: Vec<String>,
    #[serde(default)]
    pub feature_importance: BTreeMap<String, f64>,
    #[serde(default)]
    pub grade_distribution: Vec<GradeBin>,
    pub training_samples: Option<u64>,
    pub model_type: Option<String>,
}

impl ModelMetadata {
    /// True when the service sent no field at all.
    pub fn is_empty(&self) -> bool {
        self.r2_score.is_none()
            && self.mae.is_none()
            && self.features.is_empty()
            && self.categorical_features.is_empty()
            && self.numerical_features.is_empty()
            && self.feature_importance.is_empty()
            && self.grade_distribution.is_empty()
            && self.training_samples.is_none()
            && self.model_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    pub r2_score: Option<f64>,
    pub mae: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPrediction {
    /// 1-based position of the student in the submitted batch.
    pub student: usize,
    #[serde(alias = "prediction")]
    pub predicted_grade: f64,
}

/// Batch outcome. The service answers either a bare list of grades, in
/// submission order, or a list of `{student, prediction}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBatch")]
pub struct BatchPrediction {
    pub predictions: Vec<StudentPrediction>,
    pub count: usize,
    pub confidence: Option<ModelConfidence>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStudentPrediction {
    Grade(f64),
    Entry(StudentPrediction),
}

#[derive(Deserialize)]
struct RawBatch {
    predictions: Vec<RawStudentPrediction>,
    count: Option<usize>,
    confidence: Option<ModelConfidence>,
}

impl From<RawBatch> for BatchPrediction {
    fn from(raw: RawBatch) -> Self {
        let predictions: Vec<StudentPrediction> = raw
            .predictions
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                RawStudentPrediction::Grade(predicted_grade) => StudentPrediction {
                    student: i + 1,
                    predicted_grade,
                },
                RawStudentPrediction::Entry(entry) => entry,
            })
            .collect();
        Self {
            count: raw.count.unwrap_or(predictions.len()),
            predictions,
            confidence: raw.confidence,
        }
    }
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    students: &'a [StudentRecord],
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().disable_timeout().finish();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get("/health").await
    }

    pub async fn get_metadata(&self) -> Result<ModelMetadata, ApiError> {
        self.get("/metadata").await
    }

    /// Callers are expected to have validated `record` already.
    pub async fn predict_grade(&self, record: &StudentRecord) -> Result<PredictionResult, ApiError> {
        let url = self.url("/predict");
        debug!(%url, "POST");
        self.exchange(&url, self.client.post(&url).send_json(record)).await
    }

    pub async fn predict_batch(&self, records: &[StudentRecord]) -> Result<BatchPrediction, ApiError> {
        let url = self.url("/predict-batch");
        debug!(%url, students = records.len(), "POST");
        let body = BatchRequest { students: records };
        self.exchange(&url, self.client.post(&url).send_json(&body)).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!(%url, "GET");
        let request = self
            .client
            .get(&url)
            .insert_header((header::ACCEPT, "application/json"))
            .send();
        self.exchange(&url, request).await
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        url: &str,
        request: SendClientRequest,
    ) -> Result<T, ApiError> {
        let mut response = request.await.map_err(|e| {
            warn!(%url, error = %e, "prediction service unreachable");
            ApiError::connectivity()
        })?;
        let status = response.status();
        let body = response.body().limit(BODY_LIMIT).await.map_err(|e| {
            warn!(%url, error = %e, "failed to read response body");
            ApiError::connectivity()
        })?;
        decode(status, &body).inspect_err(|e| {
            warn!(%url, status = e.status, message = %e.message, "request failed");
        })
    }
}

/// Maps a raw response onto the result type or an [`ApiError`].
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if status.is_success() {
        return serde_json::from_slice(body).map_err(|e| {
            debug!(error = %e, "malformed success body");
            ApiError::connectivity()
        });
    }

    let payload: Value = serde_json::from_slice(body).map_err(|_| ApiError::connectivity())?;
    Err(error_from_body(status.as_u16(), &payload))
}

fn error_from_body(status: u16, payload: &Value) -> ApiError {
    let detail = payload.get("detail");
    let message = detail
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or(GENERIC_MESSAGE);

    let errors = match payload.get("errors").and_then(Value::as_array) {
        Some(items) => items.iter().map(value_text).collect(),
        None => detail
            .and_then(Value::as_array)
            .map(|items| items.iter().map(field_issue).collect())
            .unwrap_or_default(),
    };

    ApiError::new(status, message, errors)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Request-validation details arrive as `{"loc": [..., "age"], "msg": "..."}`.
fn field_issue(item: &Value) -> String {
    let msg = item.get("msg").map(value_text).unwrap_or_else(|| value_text(item));
    match item.get("loc").and_then(Value::as_array).and_then(|loc| loc.last()) {
        Some(field) => format!("{}: {}", value_text(field), msg),
        None => msg,
    }
}
