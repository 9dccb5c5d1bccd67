//! Model analytics: three sections over the service's model metadata.

use crate::api::{ApiClient, ModelMetadata};
use crate::error::ApiError;
use crate::navigation::{Navigation, Route};
use serde::Serialize;
use tracing::{debug, warn};

const TOP_FEATURES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Charts,
    Insights,
    Statistics,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Charts, Section::Insights, Section::Statistics];

    pub fn title(self) -> &'static str {
        match self {
            Section::Charts => "Charts",
            Section::Insights => "Insights",
            Section::Statistics => "Statistics",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsData {
    Loading,
    NoData,
    Loaded(ModelMetadata),
}

#[derive(Debug, Clone)]
pub struct AnalyticsPage {
    section: usize,
    data: AnalyticsData,
}

impl Default for AnalyticsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsPage {
    pub fn new() -> Self {
        Self {
            section: 0,
            data: AnalyticsData::Loading,
        }
    }

    pub fn at(index: usize) -> Self {
        let mut page = Self::new();
        page.select(index);
        page
    }

    pub fn index(&self) -> usize {
        self.section
    }

    pub fn section(&self) -> Section {
        Section::ALL[self.section]
    }

    pub fn data(&self) -> &AnalyticsData {
        &self.data
    }

    pub fn load(&mut self, fetched: Result<ModelMetadata, ApiError>) {
        self.data = match fetched {
            Ok(metadata) if metadata.is_empty() => {
                debug!("metadata response is empty");
                AnalyticsData::NoData
            }
            Ok(metadata) => AnalyticsData::Loaded(metadata),
            Err(e) => {
                warn!(status = e.status, "could not load model metadata: {}", e);
                AnalyticsData::NoData
            }
        };
    }

    pub async fn fetch(&mut self, api: &ApiClient) {
        self.data = AnalyticsData::Loading;
        let fetched = api.get_metadata().await;
        self.load(fetched);
    }

    /// Steps back one section. From the first section this leaves the page
    /// for the form instead.
    pub fn previous(&mut self) -> Option<Navigation> {
        if self.section == 0 {
            return Some(Navigation::to(Route::Predict));
        }
        self.section -= 1;
        None
    }

    /// Steps forward one section; no-op on the last.
    pub fn next(&mut self) {
        if self.section + 1 < Section::ALL.len() {
            self.section += 1;
        }
    }

    /// Jumps to a section. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < Section::ALL.len() {
            self.section = index;
        }
    }

    pub fn is_last(&self) -> bool {
        self.section + 1 == Section::ALL.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

/// One chart's dataset: parallel labels and values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub icon: &'static str,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Features ordered by importance, heaviest first.
pub fn ranked_features(metadata: &ModelMetadata) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = metadata
        .feature_importance
        .iter()
        .map(|(name, weight)| (name.as_str(), *weight))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

pub fn charts(metadata: &ModelMetadata) -> Vec<ChartData> {
    let mut charts = Vec::new();

    if let Some(r2) = metadata.r2_score {
        let mut footer = format!("Test Accuracy: R² = {r2:.4}");
        if let Some(mae) = metadata.mae {
            footer.push_str(&format!(" | Mean Absolute Error: {mae:.4} grades"));
        }
        charts.push(ChartData {
            title: "Model Performance Metrics".to_string(),
            kind: ChartKind::Line,
            labels: vec!["R² Score".into(), "Correlation".into(), "Accuracy %".into()],
            values: vec![r2, r2.max(0.0).sqrt(), r2 * 100.0],
            footer,
        });
    }

    let ranked = ranked_features(metadata);
    if let Some((strongest, _)) = ranked.first() {
        let top = &ranked[..ranked.len().min(TOP_FEATURES)];
        charts.push(ChartData {
            title: "Top Feature Importance".to_string(),
            kind: ChartKind::Bar,
            labels: top.iter().map(|(name, _)| name.to_string()).collect(),
            values: top.iter().map(|(_, weight)| *weight).collect(),
            footer: format!("{strongest} is the strongest predictor of final grade"),
        });
    }

    if let Some(busiest) = metadata.grade_distribution.iter().max_by_key(|bin| bin.count) {
        charts.push(ChartData {
            title: "Grade Distribution".to_string(),
            kind: ChartKind::Bar,
            labels: metadata.grade_distribution.iter().map(|bin| bin.range.clone()).collect(),
            values: metadata.grade_distribution.iter().map(|bin| bin.count as f64).collect(),
            footer: format!("Most students fall in the {} grade range", busiest.range),
        });
    }

    if let Some(r2) = metadata.r2_score {
        let explained = (r2 * 100.0).clamp(0.0, 100.0);
        charts.push(ChartData {
            title: "Overall Accuracy".to_string(),
            kind: ChartKind::Pie,
            labels: vec!["Explained Variance".into(), "Unexplained Variance".into()],
            values: vec![explained, 100.0 - explained],
            footer: format!("Model explains {explained:.2}% of grade variance on test data"),
        });
    }

    charts
}

pub fn insights(metadata: &ModelMetadata) -> Vec<Insight> {
    let mut insights = Vec::new();
    let ranked = ranked_features(metadata);
    let uses = |feature: &str| metadata.features.iter().any(|f| f == feature);

    match ranked.as_slice() {
        [(first, _), (second, _), ..] => insights.push(Insight {
            icon: "📈",
            title: "Strong Predictive Power".to_string(),
            text: format!("{first} and {second} are the most important features for predicting final grades"),
        }),
        [(only, _)] => insights.push(Insight {
            icon: "📈",
            title: "Strong Predictive Power".to_string(),
            text: format!("{only} is the most important feature for predicting final grades"),
        }),
        [] => {}
    }
    if uses("studytime") {
        insights.push(Insight {
            icon: "⏰",
            title: "Study Time Matters".to_string(),
            text: "Students who spend more time studying tend to achieve better final grades".to_string(),
        });
    }
    if uses("absences") {
        insights.push(Insight {
            icon: "❌",
            title: "Absences Impact".to_string(),
            text: "High absenteeism negatively correlates with academic performance".to_string(),
        });
    }
    if let Some(r2) = metadata.r2_score {
        insights.push(Insight {
            icon: "📊",
            title: "Model Reliability".to_string(),
            text: format!("With R² = {r2:.4}, the model explains {:.2}% of grade variance", r2 * 100.0),
        });
    }
    if let Some(mae) = metadata.mae {
        insights.push(Insight {
            icon: "🎯",
            title: "Typical Error".to_string(),
            text: format!("Predictions are off by {mae:.2} grades on average"),
        });
    }
    insights
}

pub fn statistics(metadata: &ModelMetadata) -> Vec<Statistic> {
    let mut stats = Vec::new();
    if let Some(samples) = metadata.training_samples {
        stats.push(Statistic {
            icon: "📚",
            label: "Training Data",
            value: format!("{samples} students analyzed"),
        });
    }
    if !metadata.features.is_empty() {
        stats.push(Statistic {
            icon: "🎯",
            label: "Features Used",
            value: format!(
                "{} student attributes ({} categorical, {} numerical)",
                metadata.features.len(),
                metadata.categorical_features.len(),
                metadata.numerical_features.len()
            ),
        });
    }
    if let Some(model) = &metadata.model_type {
        stats.push(Statistic {
            icon: "🤖",
            label: "Algorithm",
            value: model.clone(),
        });
    }
    if let Some(r2) = metadata.r2_score {
        stats.push(Statistic {
            icon: "✅",
            label: "Test Accuracy",
            value: format!("R² = {r2:.4}"),
        });
    }
    if let Some(mae) = metadata.mae {
        stats.push(Statistic {
            icon: "📉",
            label: "MAE",
            value: format!("{mae:.4} grades"),
        });
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GradeBin;

    fn metadata() -> ModelMetadata {
        ModelMetadata {
            r2_score: Some(0.81),
            mae: Some(1.16),
            features: vec!["G1".into(), "G2".into(), "studytime".into(), "absences".into()],
            categorical_features: vec![],
            numerical_features: vec!["G1".into(), "G2".into(), "studytime".into(), "absences".into()],
            feature_importance: [("G1", 0.28), ("G2", 0.31), ("studytime", 0.12), ("absences", 0.08)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            grade_distribution: vec![
                GradeBin { range: "0-10".into(), count: 60 },
                GradeBin { range: "10-15".into(), count: 120 },
                GradeBin { range: "15-20".into(), count: 90 },
            ],
            training_samples: Some(395),
            model_type: Some("Random Forest (100 trees)".into()),
        }
    }

    #[test]
    fn test_previous_from_first_section_goes_to_form() {
        let mut page = AnalyticsPage::new();
        assert_eq!(page.previous(), Some(Navigation::to(Route::Predict)));
        assert_eq!(page.index(), 0);
    }

    #[test]
    fn test_previous_decrements_by_one() {
        let mut page = AnalyticsPage::at(2);
        assert_eq!(page.previous(), None);
        assert_eq!(page.section(), Section::Insights);
        assert_eq!(page.previous(), None);
        assert_eq!(page.section(), Section::Charts);
    }

    #[test]
    fn test_next_stops_at_last_section() {
        let mut page = AnalyticsPage::new();
        page.next();
        page.next();
        assert!(page.is_last());
        page.next();
        assert_eq!(page.section(), Section::Statistics);
    }

    #[test]
    fn test_select_ignores_out_of_range() {
        let mut page = AnalyticsPage::at(1);
        page.select(7);
        assert_eq!(page.index(), 1);
    }

    #[test]
    fn test_load_outcomes() {
        let mut page = AnalyticsPage::new();
        assert_eq!(page.data(), &AnalyticsData::Loading);

        page.load(Ok(ModelMetadata::default()));
        assert_eq!(page.data(), &AnalyticsData::NoData);

        page.load(Err(ApiError::connectivity()));
        assert_eq!(page.data(), &AnalyticsData::NoData);

        page.load(Ok(metadata()));
        assert!(matches!(page.data(), AnalyticsData::Loaded(_)));
    }

    #[test]
    fn test_charts_follow_metadata() {
        let charts = charts(&metadata());
        assert_eq!(charts.len(), 4);

        let performance = &charts[0];
        assert_eq!(performance.values[0], 0.81);
        assert!((performance.values[1] - 0.9).abs() < 1e-9);
        assert!((performance.values[2] - 81.0).abs() < 1e-9);

        let importance = &charts[1];
        assert_eq!(importance.labels, vec!["G2", "G1", "studytime", "absences"]);
        assert!(importance.footer.starts_with("G2"));

        assert_eq!(charts[2].footer, "Most students fall in the 10-15 grade range");
        assert!((charts[3].values[0] + charts[3].values[1] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_charts_skip_missing_series() {
        let only_r2 = ModelMetadata {
            r2_score: Some(0.5),
            ..ModelMetadata::default()
        };
        let titles: Vec<String> = charts(&only_r2).into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Model Performance Metrics", "Overall Accuracy"]);
    }

    #[test]
    fn test_importance_capped_at_ten() {
        let mut many = ModelMetadata::default();
        for i in 0..15 {
            many.feature_importance.insert(format!("f{i:02}"), i as f64);
        }
        let charts = charts(&many);
        assert_eq!(charts[0].labels.len(), TOP_FEATURES);
        assert_eq!(charts[0].labels[0], "f14");
    }

    #[test]
    fn test_insights_and_statistics() {
        let insights = insights(&metadata());
        assert_eq!(insights.len(), 5);
        assert!(insights[0].text.starts_with("G2 and G1"));

        let stats = statistics(&metadata());
        assert_eq!(stats[0].value, "395 students analyzed");
        assert!(stats.iter().any(|s| s.label == "Algorithm"));
    }
}
