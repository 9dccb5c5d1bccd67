use thiserror::Error;

pub const GENERIC_MESSAGE: &str = "An error occurred";
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to the server. Please check your connection.";

/// Failure of a single exchange with the prediction service.
///
/// `status` is the HTTP status the service answered with, or 0 when no usable
/// response arrived (unreachable host, broken transfer, body that is not JSON).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors,
        }
    }

    pub fn connectivity() -> Self {
        Self::new(0, CONNECTIVITY_MESSAGE, Vec::new())
    }

    pub fn is_connectivity(&self) -> bool {
        self.status == 0
    }
}

/// Startup failures of the web client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_message() {
        let err = ApiError::new(500, "bad input", vec![]);
        assert_eq!(err.to_string(), "bad input");
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_connectivity_error() {
        let err = ApiError::connectivity();
        assert_eq!(err.status, 0);
        assert!(err.is_connectivity());
        assert!(err.errors.is_empty());
        assert_eq!(err.to_string(), CONNECTIVITY_MESSAGE);
    }
}
