use crate::api::PredictionResult;
use crate::navigation::{Navigation, Route};

/// Qualitative reading of a predicted grade on the 0-20 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GradeBucket {
    NeedsAttention,
    Average,
    Good,
    Excellent,
}

pub struct Interpretation {
    pub icon: &'static str,
    pub headline: &'static str,
    pub summary: &'static str,
    pub points: &'static [&'static str],
    pub recommendation: &'static str,
}

impl GradeBucket {
    pub const ALL: [GradeBucket; 4] = [
        GradeBucket::Excellent,
        GradeBucket::Good,
        GradeBucket::Average,
        GradeBucket::NeedsAttention,
    ];

    pub fn from_grade(grade: f64) -> Self {
        if grade >= 18.0 {
            GradeBucket::Excellent
        } else if grade >= 15.0 {
            GradeBucket::Good
        } else if grade >= 10.0 {
            GradeBucket::Average
        } else {
            GradeBucket::NeedsAttention
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GradeBucket::Excellent => "Excellent",
            GradeBucket::Good => "Good",
            GradeBucket::Average => "Average",
            GradeBucket::NeedsAttention => "Needs Attention",
        }
    }

    /// CSS class for the bucket's card.
    pub fn tone(self) -> &'static str {
        match self {
            GradeBucket::Excellent => "success",
            GradeBucket::Good => "warning",
            GradeBucket::Average => "info",
            GradeBucket::NeedsAttention => "error",
        }
    }

    pub fn interpretation(self) -> &'static Interpretation {
        match self {
            GradeBucket::Excellent => &EXCELLENT,
            GradeBucket::Good => &GOOD,
            GradeBucket::Average => &AVERAGE,
            GradeBucket::NeedsAttention => &NEEDS_ATTENTION,
        }
    }
}

static EXCELLENT: Interpretation = Interpretation {
    icon: "🌟",
    headline: "Excellent Performance (18-20)",
    summary: "Outstanding achievement! The student demonstrates exceptional mastery of the subject matter.",
    points: &[
        "✓ Strong academic foundation",
        "✓ Excellent study habits and discipline",
        "✓ High likelihood of continued success",
    ],
    recommendation: "Encourage advanced coursework and leadership opportunities.",
};

static GOOD: Interpretation = Interpretation {
    icon: "📚",
    headline: "Good Performance (15-17)",
    summary: "Solid academic performance with room for excellence. The student shows strong understanding.",
    points: &[
        "✓ Good grasp of core concepts",
        "✓ Consistent study patterns",
        "→ Potential for improvement to excellent range",
    ],
    recommendation: "Focus on challenging topics and seek clarification on difficult concepts.",
};

static AVERAGE: Interpretation = Interpretation {
    icon: "📖",
    headline: "Average Performance (10-14)",
    summary: "The student meets basic requirements but has significant potential for improvement.",
    points: &[
        "→ Basic understanding present",
        "⚠ Needs more consistent study time",
        "→ Additional support recommended",
    ],
    recommendation: "Increase study hours, consider tutoring, and improve attendance.",
};

static NEEDS_ATTENTION: Interpretation = Interpretation {
    icon: "⚠️",
    headline: "Needs Attention (Below 10)",
    summary: "Immediate intervention required. The student needs substantial support to improve performance.",
    points: &[
        "⚠ Struggling with fundamentals",
        "⚠ High risk of academic failure",
        "⚠ Requires urgent support",
    ],
    recommendation: "Urgent - Arrange one-on-one tutoring, parental meeting, and create personalized study plan.",
};

/// What the results page shows for a given handoff.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// Reached without a prediction, e.g. by typing the URL.
    NoData,
    Prediction {
        result: PredictionResult,
        bucket: GradeBucket,
    },
}

impl ResultsView {
    pub fn from_handoff(handoff: Option<PredictionResult>) -> Self {
        match handoff {
            Some(result) => ResultsView::Prediction {
                bucket: GradeBucket::from_grade(result.predicted_grade),
                result,
            },
            None => ResultsView::NoData,
        }
    }

    /// Follow-up controls offered by the view.
    pub fn actions(&self) -> Vec<(&'static str, Navigation)> {
        match self {
            ResultsView::NoData => vec![("Go to Predict", Navigation::to(Route::Predict))],
            ResultsView::Prediction { .. } => vec![
                ("New Prediction", Navigation::to(Route::Predict)),
                ("View Analytics", Navigation::to(Route::Analytics)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_thresholds() {
        assert_eq!(GradeBucket::from_grade(20.0), GradeBucket::Excellent);
        assert_eq!(GradeBucket::from_grade(18.0), GradeBucket::Excellent);
        assert_eq!(GradeBucket::from_grade(17.99), GradeBucket::Good);
        assert_eq!(GradeBucket::from_grade(15.0), GradeBucket::Good);
        assert_eq!(GradeBucket::from_grade(14.5), GradeBucket::Average);
        assert_eq!(GradeBucket::from_grade(10.0), GradeBucket::Average);
        assert_eq!(GradeBucket::from_grade(9.99), GradeBucket::NeedsAttention);
        assert_eq!(GradeBucket::from_grade(0.0), GradeBucket::NeedsAttention);
    }

    #[test]
    fn test_every_bucket_has_text() {
        for bucket in GradeBucket::ALL {
            let text = bucket.interpretation();
            assert!(text.headline.starts_with(bucket.name()));
            assert_eq!(text.points.len(), 3);
            assert!(!text.recommendation.is_empty());
        }
    }

    #[test]
    fn test_missing_handoff_offers_way_back() {
        let view = ResultsView::from_handoff(None);
        assert_eq!(view, ResultsView::NoData);
        let actions = view.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].1.route, Route::Predict);
    }

    #[test]
    fn test_prediction_view() {
        let result = PredictionResult::new(14.5, None).unwrap();
        let view = ResultsView::from_handoff(Some(result));
        assert!(matches!(view, ResultsView::Prediction { bucket: GradeBucket::Average, .. }));
        let routes: Vec<Route> = view.actions().into_iter().map(|(_, nav)| nav.route).collect();
        assert_eq!(routes, vec![Route::Predict, Route::Analytics]);
    }
}
