//! The prediction form: draft record, validation, submission and handoff.

use crate::api::{ApiClient, PredictionResult};
use crate::error::ApiError;
use crate::navigation::Navigation;
use crate::record::{Address, Choice, FamilySize, Guardian, Job, ParentStatus, Reason, School, Sex, StudentRecord};
use crate::validation::{validate, ValidationErrors};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
    Succeeded,
}

/// What the caller should do once a submit attempt settles.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid,
    /// The service answered; follow `to` after `after` has elapsed.
    Navigate { after: Duration, to: Navigation },
    /// The exchange failed; the page carries the error message.
    Failed,
}

#[derive(Debug, Clone)]
pub struct PredictPage {
    draft: StudentRecord,
    phase: FormPhase,
    input_errors: ValidationErrors,
    errors: ValidationErrors,
    result: Option<PredictionResult>,
    error: Option<String>,
    service_errors: Vec<String>,
}

impl Default for PredictPage {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictPage {
    pub fn new() -> Self {
        Self {
            draft: StudentRecord::default(),
            phase: FormPhase::Idle,
            input_errors: ValidationErrors::new(),
            errors: ValidationErrors::new(),
            result: None,
            error: None,
            service_errors: Vec::new(),
        }
    }

    pub fn draft(&self) -> &StudentRecord {
        &self.draft
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn service_errors(&self) -> &[String] {
        &self.service_errors
    }

    /// Applies one raw input. A rejected value keeps the previous one and is
    /// reported on the next submit.
    pub fn set_field(&mut self, field: &str, raw: &str) {
        match self.draft.set_field(field, raw) {
            Ok(()) => {
                self.input_errors.remove(field);
            }
            Err(e) => {
                self.input_errors.insert(field.to_string(), e.to_string());
            }
        }
    }

    pub fn apply_form<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (field, raw) in fields {
            if field.as_ref() == ACTION_FIELD {
                continue;
            }
            self.set_field(field.as_ref(), raw.as_ref());
        }
    }

    /// Back to the default snapshot. Does not touch the service.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Starts an attempt: clears the previous outcome and validates the draft.
    /// Returns the record to send, or `None` when validation blocked it.
    pub fn begin_submit(&mut self) -> Option<StudentRecord> {
        self.error = None;
        self.result = None;
        self.service_errors.clear();

        let mut errors = validate(&self.draft).errors;
        errors.extend(self.input_errors.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.errors = errors;

        if !self.errors.is_empty() {
            self.phase = FormPhase::Idle;
            return None;
        }
        self.phase = FormPhase::Submitting;
        Some(self.draft.clone())
    }

    pub fn finish_submit(
        &mut self,
        outcome: Result<PredictionResult, ApiError>,
        service_url: &str,
        redirect_delay: Duration,
    ) -> SubmitOutcome {
        match outcome {
            Ok(result) => {
                self.phase = FormPhase::Succeeded;
                self.result = Some(result.clone());
                SubmitOutcome::Navigate {
                    after: redirect_delay,
                    to: Navigation::results(result),
                }
            }
            Err(err) => {
                self.phase = FormPhase::Idle;
                self.error = Some(format!(
                    "Error: {err}. Make sure the prediction service is reachable at {service_url}"
                ));
                self.service_errors = err.errors;
                SubmitOutcome::Failed
            }
        }
    }

    pub async fn submit(&mut self, api: &ApiClient, redirect_delay: Duration) -> SubmitOutcome {
        let Some(record) = self.begin_submit() else {
            info!(fields = self.errors.len(), "prediction blocked by validation");
            return SubmitOutcome::Invalid;
        };

        let outcome = api.predict_grade(&record).await;
        match &outcome {
            Ok(result) => info!(grade = result.predicted_grade, "prediction received"),
            Err(e) => warn!(status = e.status, "prediction failed: {}", e),
        }
        self.finish_submit(outcome, api.base_url(), redirect_delay)
    }
}

/// Form field carrying the submit button's intent.
pub const ACTION_FIELD: &str = "action";
pub const RESET_ACTION: &str = "reset";

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Number,
    Choice(fn() -> Vec<(&'static str, &'static str)>),
    YesNo,
}

#[derive(Debug, Clone, Copy)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub struct FormSection {
    pub title: &'static str,
    pub fields: &'static [FormField],
}

pub fn options<T: Choice>() -> Vec<(&'static str, &'static str)> {
    T::ALL.iter().map(|c| (c.as_str(), c.label())).collect()
}

const fn number(name: &'static str, label: &'static str) -> FormField {
    FormField { name, label, kind: FieldKind::Number }
}

const fn yes_no(name: &'static str, label: &'static str) -> FormField {
    FormField { name, label, kind: FieldKind::YesNo }
}

const fn choice(name: &'static str, label: &'static str, list: fn() -> Vec<(&'static str, &'static str)>) -> FormField {
    FormField { name, label, kind: FieldKind::Choice(list) }
}

pub const FORM_SECTIONS: &[FormSection] = &[
    FormSection {
        title: "Basic Information",
        fields: &[
            choice("school", "School", options::<School>),
            choice("sex", "Sex", options::<Sex>),
            number("age", "Age"),
            choice("address", "Address Type", options::<Address>),
        ],
    },
    FormSection {
        title: "Family Information",
        fields: &[
            choice("famsize", "Family Size", options::<FamilySize>),
            choice("Pstatus", "Parent Cohabitation", options::<ParentStatus>),
            number("Medu", "Mother's Education"),
            number("Fedu", "Father's Education"),
            choice("Mjob", "Mother's Job", options::<Job>),
            choice("Fjob", "Father's Job", options::<Job>),
        ],
    },
    FormSection {
        title: "Academic Information",
        fields: &[
            choice("reason", "Reason for Choosing School", options::<Reason>),
            choice("guardian", "Guardian", options::<Guardian>),
            number("traveltime", "Travel Time (1-4)"),
            number("studytime", "Study Time (1-4)"),
            number("failures", "Past Class Failures"),
            yes_no("schoolsup", "School Support"),
        ],
    },
    FormSection {
        title: "Additional Information",
        fields: &[
            yes_no("famsup", "Family Support"),
            yes_no("paid", "Extra Paid Classes"),
            yes_no("activities", "Extracurricular Activities"),
            yes_no("nursery", "Attended Nursery School"),
            yes_no("higher", "Wants to Pursue Higher Ed."),
            yes_no("internet", "Internet Access"),
            yes_no("romantic", "In a Romantic Relationship"),
            number("famrel", "Family Relationship Quality (1-5)"),
            number("freetime", "Free Time (1-5)"),
            number("goout", "Going Out (1-5)"),
            number("Dalc", "Weekday Alcohol Consumption (1-5)"),
            number("Walc", "Weekend Alcohol Consumption (1-5)"),
            number("health", "Current Health (1-5)"),
            number("absences", "School Absences"),
            number("G1", "Period 1 Grade (G1)"),
            number("G2", "Period 2 Grade (G2)"),
        ],
    },
];
