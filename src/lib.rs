//! Web client for a student grade prediction service: a prediction form,
//! results with interpretation, batch CSV predictions and model analytics.

pub mod api;
pub mod config;
pub mod error;
pub mod navigation;
pub mod pages;
pub mod record;
pub mod server;
pub mod validation;
pub mod views;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, AppError};
pub use record::StudentRecord;
