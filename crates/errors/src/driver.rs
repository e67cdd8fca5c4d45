//! Driver execution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failures raised by a driver itself. A non-zero exit code is not an error.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum DriverError {
    #[error("driver {driver} failed: {message}")]
    Failed { driver: String, message: String },

    #[error("driver {driver} was cancelled")]
    Cancelled { driver: String },
}

impl DriverError {
    /// Create a failure for the named driver
    pub fn failed(driver: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            driver: driver.into(),
            message: message.into(),
        }
    }
}

impl UserFacingError for DriverError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "driver.failed",
            Self::Cancelled { .. } => "driver.cancelled",
        };
        Some(code)
    }
}
