//! Errors reported by the driveline binary

use std::fmt::{self, Write as _};

use driveline_errors::UserFacingError;

#[derive(Debug)]
pub enum CliError {
    /// The console driver failed to build or one of its drivers failed
    Host(driveline_errors::Error),
    /// A flag value that clap accepts but driveline cannot use
    InvalidArguments(String),
}

/// Message followed by indented code, hint, and retry lines
fn describe(error: &dyn UserFacingError) -> String {
    let mut text = error.user_message().into_owned();
    let extras = [
        error.user_code().map(|code| format!("Code: {code}")),
        error.user_hint().map(|hint| format!("Hint: {hint}")),
        error
            .is_retryable()
            .then(|| "Retry: running the command again may succeed.".to_string()),
    ];
    for line in extras.into_iter().flatten() {
        let _ = write!(text, "\n  {line}");
    }
    text
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(error) => f.write_str(&describe(error)),
            Self::InvalidArguments(reason) => write!(f, "Invalid arguments: {reason}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Host(error) => Some(error),
            Self::InvalidArguments(_) => None,
        }
    }
}

impl From<driveline_errors::Error> for CliError {
    fn from(error: driveline_errors::Error) -> Self {
        Self::Host(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveline_errors::DriverError;

    #[test]
    fn test_invalid_arguments_display() {
        let error = CliError::InvalidArguments("--environment must not be blank".into());
        assert_eq!(error.to_string(), "Invalid arguments: --environment must not be blank");
    }

    #[test]
    fn test_host_error_lists_code() {
        let error = CliError::from(driveline_errors::Error::from(DriverError::Cancelled {
            driver: "greeting".into(),
        }));
        let text = error.to_string();
        assert!(text.lines().count() >= 2);
        assert!(text.contains("  Code: "));
    }
}
