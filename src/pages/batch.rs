//! Batch prediction from pasted CSV, one student per row.

use crate::api::{ApiClient, BatchPrediction};
use crate::pages::results::GradeBucket;
use crate::record::StudentRecord;
use crate::validation::validate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::error::Error;
use tracing::{info, warn};

pub const EMPTY_INPUT: &str = "No valid student data found. Please check CSV format.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row; 0 refers to the header.
    pub row: usize,
    pub message: String,
}

/// Parses and validates every row. Any problem rejects the whole batch.
pub fn parse_csv(text: &str) -> Result<Vec<StudentRecord>, Vec<RowError>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.trim().as_bytes());

    let headers = rdr.headers().map_err(|e| vec![header_error(e.to_string())])?.clone();
    let missing: Vec<&str> = StudentRecord::FIELDS
        .iter()
        .copied()
        .filter(|field| !headers.iter().any(|h| h == *field))
        .collect();
    if !missing.is_empty() {
        return Err(vec![header_error(format!("missing columns: {}", missing.join(", ")))]);
    }

    let mut students = Vec::new();
    let mut errors = Vec::new();
    for (i, row) in rdr.deserialize::<StudentRecord>().enumerate() {
        let row_number = i + 1;
        match row {
            Ok(record) => {
                let validation = validate(&record);
                if validation.is_valid {
                    students.push(record);
                } else {
                    errors.extend(validation.errors.into_iter().map(|(field, message)| RowError {
                        row: row_number,
                        message: format!("{field}: {message}"),
                    }));
                }
            }
            Err(e) => errors.push(RowError {
                row: row_number,
                message: e.to_string(),
            }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    if students.is_empty() {
        return Err(vec![header_error(EMPTY_INPUT.to_string())]);
    }
    Ok(students)
}

fn header_error(message: String) -> RowError {
    RowError { row: 0, message }
}

/// Header plus one row holding the default record, as a starting point.
pub fn template_csv() -> Result<String, Box<dyn Error>> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.serialize(StudentRecord::default())?;
    let bytes = wtr.into_inner().map_err(|e| e.to_string())?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub student: usize,
    pub grade: f64,
    pub bucket: GradeBucket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub rows: Vec<BatchRow>,
    pub count: usize,
    pub mean_grade: f64,
    /// Students per bucket, best bucket first.
    pub bucket_counts: Vec<(GradeBucket, usize)>,
    pub r2_score: Option<f64>,
}

impl BatchSummary {
    pub fn from_prediction(prediction: &BatchPrediction) -> Self {
        let rows: Vec<BatchRow> = prediction
            .predictions
            .iter()
            .map(|p| BatchRow {
                student: p.student,
                grade: p.predicted_grade,
                bucket: GradeBucket::from_grade(p.predicted_grade),
            })
            .collect();

        let count = rows.len();
        let mean_grade = if count > 0 {
            rows.iter().map(|r| r.grade).sum::<f64>() / count as f64
        } else {
            0.0
        };
        let bucket_counts = GradeBucket::ALL
            .iter()
            .map(|bucket| (*bucket, rows.iter().filter(|r| r.bucket == *bucket).count()))
            .collect();

        Self {
            rows,
            count,
            mean_grade,
            bucket_counts,
            r2_score: prediction.confidence.and_then(|c| c.r2_score),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchPage {
    csv: String,
    row_errors: Vec<RowError>,
    summary: Option<BatchSummary>,
    error: Option<String>,
    service_errors: Vec<String>,
}

impl BatchPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csv(csv: impl Into<String>) -> Self {
        Self {
            csv: csv.into(),
            ..Self::default()
        }
    }

    pub fn csv(&self) -> &str {
        &self.csv
    }

    pub fn row_errors(&self) -> &[RowError] {
        &self.row_errors
    }

    pub fn summary(&self) -> Option<&BatchSummary> {
        self.summary.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn service_errors(&self) -> &[String] {
        &self.service_errors
    }

    pub async fn submit(&mut self, api: &ApiClient) {
        self.row_errors.clear();
        self.summary = None;
        self.error = None;
        self.service_errors.clear();

        let students = match parse_csv(&self.csv) {
            Ok(students) => students,
            Err(errors) => {
                info!(problems = errors.len(), "batch blocked by validation");
                self.row_errors = errors;
                return;
            }
        };

        match api.predict_batch(&students).await {
            Ok(prediction) => {
                info!(students = students.len(), "batch prediction received");
                self.summary = Some(BatchSummary::from_prediction(&prediction));
            }
            Err(e) => {
                warn!(status = e.status, "batch prediction failed: {}", e);
                self.error = Some(format!(
                    "Error processing batch: {e}. Make sure the prediction service is reachable at {}",
                    api.base_url()
                ));
                self.service_errors = e.errors;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StudentPrediction;

    fn csv_with_rows(rows: &[&[(&str, &str)]]) -> String {
        let template = template_csv().unwrap();
        let mut lines = template.lines();
        let header = lines.next().unwrap().to_string();
        let default_row = lines.next().unwrap().to_string();
        let columns: Vec<&str> = header.split(',').collect();

        let mut out = vec![header.clone()];
        for overrides in rows {
            let mut cells: Vec<String> = default_row.split(',').map(String::from).collect();
            for (field, value) in overrides.iter() {
                let idx = columns.iter().position(|c| c == field).unwrap();
                cells[idx] = value.to_string();
            }
            out.push(cells.join(","));
        }
        out.join("\n")
    }

    #[test]
    fn test_template_has_every_column() {
        let template = template_csv().unwrap();
        let header = template.lines().next().unwrap();
        assert_eq!(header.split(',').count(), StudentRecord::FIELDS.len());
        assert!(header.starts_with("school,sex,age"));
    }

    #[test]
    fn test_parse_valid_rows() {
        let csv = csv_with_rows(&[&[], &[("age", "18"), ("sex", "M"), ("higher", "no")]]);
        let students = parse_csv(&csv).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[1].age, 18);
        assert!(!students[1].higher);
    }

    #[test]
    fn test_row_errors_name_the_row() {
        let csv = csv_with_rows(&[&[], &[("age", "40")], &[("paid", "sometimes")]]);
        let errors = parse_csv(&csv).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row, 2);
        assert!(errors[0].message.starts_with("age:"));
        assert_eq!(errors[1].row, 3);
    }

    #[test]
    fn test_missing_columns_and_empty_input() {
        let errors = parse_csv("name,hours,attendance\nJohn,6.5,85").unwrap_err();
        assert_eq!(errors[0].row, 0);
        assert!(errors[0].message.starts_with("missing columns: school"));

        let header_only = csv_with_rows(&[]);
        let errors = parse_csv(&header_only).unwrap_err();
        assert_eq!(errors[0].message, EMPTY_INPUT);
    }

    #[test]
    fn test_summary() {
        let prediction = BatchPrediction {
            predictions: vec![
                StudentPrediction { student: 1, predicted_grade: 19.0 },
                StudentPrediction { student: 2, predicted_grade: 12.0 },
                StudentPrediction { student: 3, predicted_grade: 11.0 },
            ],
            count: 3,
            confidence: None,
        };
        let summary = BatchSummary::from_prediction(&prediction);
        assert_eq!(summary.count, 3);
        assert!((summary.mean_grade - 14.0).abs() < 1e-9);
        assert_eq!(summary.bucket_counts[0], (GradeBucket::Excellent, 1));
        assert_eq!(summary.bucket_counts[2], (GradeBucket::Average, 2));
        assert_eq!(summary.rows[1].bucket, GradeBucket::Average);
    }
}
