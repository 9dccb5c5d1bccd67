//! Route table and page-to-page handoff.
//!
//! The only state that crosses pages is the prediction result passed from the
//! form to the results page. It travels as an explicit payload on the
//! navigation itself, encoded into the `/results` query string.

use crate::api::{ModelConfidence, PredictionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Predict,
    Results,
    Analytics,
    Batch,
}

impl Route {
    /// Routes shown in the top navigation bar, in display order.
    pub const MENU: [Route; 4] = [Route::Home, Route::Predict, Route::Batch, Route::Analytics];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Predict => "/predict",
            Route::Results => "/results",
            Route::Analytics => "/analytics",
            Route::Batch => "/batch",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        [Route::Home, Route::Predict, Route::Results, Route::Analytics, Route::Batch]
            .into_iter()
            .find(|route| route.path() == path)
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Predict => "Predict",
            Route::Results => "Results",
            Route::Analytics => "Analytics",
            Route::Batch => "Batch",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Route::Home => "🏠",
            Route::Predict => "⚡",
            Route::Results => "🎯",
            Route::Analytics => "📊",
            Route::Batch => "📁",
        }
    }
}

/// A move to another page, optionally carrying the prediction handoff.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub route: Route,
    pub prediction: Option<PredictionResult>,
}

impl Navigation {
    pub fn to(route: Route) -> Self {
        Self {
            route,
            prediction: None,
        }
    }

    pub fn results(prediction: PredictionResult) -> Self {
        Self {
            route: Route::Results,
            prediction: Some(prediction),
        }
    }

    pub fn url(&self) -> String {
        let path = self.route.path();
        match &self.prediction {
            Some(prediction) => {
                let handoff = Handoff {
                    predicted_grade: prediction.predicted_grade,
                    r2_score: prediction.r2_score(),
                    mae: prediction.mae(),
                };
                match serde_urlencoded::to_string(&handoff) {
                    Ok(query) => format!("{path}?{query}"),
                    Err(_) => path.to_string(),
                }
            }
            None => path.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Handoff {
    predicted_grade: f64,
    r2_score: Option<f64>,
    mae: Option<f64>,
}

/// Reads the prediction handoff from a `/results` query string. Anything
/// missing, malformed or out of range is the absent case.
pub fn take_handoff(query: &str) -> Option<PredictionResult> {
    let handoff: Handoff = serde_urlencoded::from_str(query).ok()?;
    let confidence = (handoff.r2_score.is_some() || handoff.mae.is_some()).then_some(ModelConfidence {
        r2_score: handoff.r2_score,
        mae: handoff.mae,
    });
    PredictionResult::new(handoff.predicted_grade, confidence).ok()
}
