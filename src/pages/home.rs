use crate::api::{ApiClient, HealthStatus};
use crate::error::ApiError;

/// State of the prediction service as shown on the landing page.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceBadge {
    Healthy { r2_score: Option<f64>, mae: Option<f64> },
    /// Reachable, but not ready to predict.
    Degraded(String),
    Unreachable(String),
}

impl ServiceBadge {
    pub fn from_check(check: Result<HealthStatus, ApiError>) -> Self {
        match check {
            Ok(health) if health.status == "healthy" && health.model_loaded => ServiceBadge::Healthy {
                r2_score: health.r2_score,
                mae: health.mae,
            },
            Ok(health) => ServiceBadge::Degraded(health.status),
            Err(e) => ServiceBadge::Unreachable(e.message),
        }
    }

    pub async fn probe(api: &ApiClient) -> Self {
        Self::from_check(api.health_check().await)
    }
}

pub const FEATURES: &[(&str, &str, &str)] = &[
    ("👤", "Student Profile", "Analyze 32 student attributes including demographics and academic performance"),
    ("⚡", "Smart Predictions", "Get grade predictions from the trained prediction service"),
    ("📊", "Analytics", "View charts and insights about model performance and data distribution"),
    ("📁", "Batch Predictions", "Paste a CSV of students and predict all of them at once"),
];

pub const STEPS: &[&str] = &[
    "Fill in the student information form",
    "The prediction service analyzes the data",
    "Receive the predicted final grade",
    "View analytics and model insights",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn health(status: &str, model_loaded: bool) -> HealthStatus {
        HealthStatus {
            status: status.to_string(),
            model_loaded,
            r2_score: Some(0.81),
            mae: None,
        }
    }

    #[test]
    fn test_badge_states() {
        assert_eq!(
            ServiceBadge::from_check(Ok(health("healthy", true))),
            ServiceBadge::Healthy { r2_score: Some(0.81), mae: None }
        );
        assert_eq!(
            ServiceBadge::from_check(Ok(health("healthy", false))),
            ServiceBadge::Degraded("healthy".to_string())
        );
        assert!(matches!(
            ServiceBadge::from_check(Err(ApiError::connectivity())),
            ServiceBadge::Unreachable(_)
        ));
    }
}
