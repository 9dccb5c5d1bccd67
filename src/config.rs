use crate::error::AppError;
use std::net::SocketAddr;
use std::time::Duration;

pub const API_URL_VAR: &str = "GRADE_PREDICTOR_API_URL";
pub const BIND_VAR: &str = "GRADE_PREDICTOR_BIND";
pub const REDIRECT_VAR: &str = "GRADE_PREDICTOR_REDIRECT_MS";

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_REDIRECT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the prediction service, without a trailing slash.
    pub api_url: String,
    pub bind: SocketAddr,
    /// Pause between a successful prediction and the move to the results page.
    pub redirect_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "{API_URL_VAR} must be an http(s) URL, got {api_url:?}"
            )));
        }

        let bind_raw = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("{BIND_VAR}={bind_raw:?} is not a socket address: {e}"))
        })?;

        let redirect_ms = match lookup(REDIRECT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("{REDIRECT_VAR}={raw:?} is not a number of milliseconds: {e}"))
            })?,
            None => DEFAULT_REDIRECT_MS,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bind,
            redirect_delay: Duration::from_millis(redirect_ms),
        })
    }
}
