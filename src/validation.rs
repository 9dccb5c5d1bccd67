use crate::record::StudentRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field name to message, ordered by field name.
pub type ValidationErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: ValidationErrors,
}

/// Inclusive numeric bounds for one attribute. `max: None` means unbounded.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    pub field: &'static str,
    pub min: i32,
    pub max: Option<i32>,
    message: Option<&'static str>,
}

impl Range {
    const fn new(field: &'static str, min: i32, max: i32) -> Self {
        Self { field, min, max: Some(max), message: None }
    }

    const fn with_message(self, message: &'static str) -> Self {
        Self { message: Some(message), ..self }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }

    fn message(&self) -> String {
        match (self.message, self.max) {
            (Some(message), _) => message.to_string(),
            (None, Some(max)) => format!("{} must be between {} and {}", self.field, self.min, max),
            (None, None) => format!("{} must be at least {}", self.field, self.min),
        }
    }
}

pub const RANGES: &[Range] = &[
    Range::new("age", 15, 22).with_message("Age must be between 15 and 22"),
    Range::new("Medu", 0, 4).with_message("Mother's education must be between 0 and 4"),
    Range::new("Fedu", 0, 4).with_message("Father's education must be between 0 and 4"),
    Range::new("famrel", 1, 5),
    Range::new("freetime", 1, 5),
    Range::new("goout", 1, 5),
    Range::new("Dalc", 1, 5),
    Range::new("Walc", 1, 5),
    Range::new("health", 1, 5),
    Range::new("traveltime", 1, 4),
    Range::new("studytime", 1, 4),
    Range::new("failures", 0, 4).with_message("Failures must be between 0 and 4"),
    Range { field: "absences", min: 0, max: None, message: Some("Absences cannot be negative") },
    Range::new("G1", 0, 20),
    Range::new("G2", 0, 20),
];

pub fn validate(record: &StudentRecord) -> Validation {
    let errors: ValidationErrors = RANGES
        .iter()
        .filter_map(|range| {
            let value = record.numeric(range.field)?;
            (!range.contains(value)).then(|| (range.field.to_string(), range.message()))
        })
        .collect();

    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_bounds() -> StudentRecord {
        let mut record = StudentRecord::default();
        for range in RANGES {
            let value = range.max.unwrap_or(range.min + 30);
            record.set_field(range.field, &value.to_string()).unwrap();
        }
        record
    }

    #[test]
    fn test_default_record_is_valid() {
        let result = validate(&StudentRecord::default());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_inclusive_bounds_are_valid() {
        assert!(validate(&upper_bounds()).is_valid);

        let mut record = StudentRecord::default();
        for range in RANGES {
            record.set_field(range.field, &range.min.to_string()).unwrap();
        }
        assert!(validate(&record).is_valid);
    }

    #[test]
    fn test_each_out_of_range_field_is_reported_on_its_own() {
        for range in RANGES {
            for bad in [Some(range.min - 1), range.max.map(|max| max + 1)].into_iter().flatten() {
                let mut record = upper_bounds();
                record.set_field(range.field, &bad.to_string()).unwrap();

                let result = validate(&record);
                assert!(!result.is_valid, "{} = {} accepted", range.field, bad);
                assert_eq!(result.errors.len(), 1);
                assert!(result.errors.contains_key(range.field));
            }
        }
    }

    #[test]
    fn test_messages() {
        let mut record = StudentRecord::default();
        record.age = 30;
        record.medu = 5;
        record.goout = 0;
        record.studytime = 9;
        record.absences = -1;
        record.g1 = 21;

        let errors = validate(&record).errors;
        assert_eq!(errors["age"], "Age must be between 15 and 22");
        assert_eq!(errors["Medu"], "Mother's education must be between 0 and 4");
        assert_eq!(errors["goout"], "goout must be between 1 and 5");
        assert_eq!(errors["studytime"], "studytime must be between 1 and 4");
        assert_eq!(errors["absences"], "Absences cannot be negative");
        assert_eq!(errors["G1"], "G1 must be between 0 and 20");
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_validate_does_not_mutate_input() {
        let mut record = StudentRecord::default();
        record.failures = 7;
        let before = record.clone();
        let _ = validate(&record);
        assert_eq!(record, before);
    }
}
