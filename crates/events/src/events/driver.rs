use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Events for a single driver run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DriverEvent {
    /// Driver was invoked; `index` is its registration position
    Started { driver: String, index: usize },

    /// Driver returned an exit code
    Completed { driver: String, exit_code: i32 },

    /// Driver returned an error; later drivers are not run
    Failed {
        driver: String,
        failure: FailureContext,
    },
}

impl DriverEvent {
    #[must_use]
    pub fn started(driver: impl Into<String>, index: usize) -> Self {
        Self::Started {
            driver: driver.into(),
            index,
        }
    }

    #[must_use]
    pub fn completed(driver: impl Into<String>, exit_code: i32) -> Self {
        Self::Completed {
            driver: driver.into(),
            exit_code,
        }
    }

    #[must_use]
    pub fn failed(driver: impl Into<String>, failure: FailureContext) -> Self {
        Self::Failed {
            driver: driver.into(),
            failure,
        }
    }

    /// Name of the driver this event refers to
    #[must_use]
    pub fn driver(&self) -> &str {
        match self {
            Self::Started { driver, .. }
            | Self::Completed { driver, .. }
            | Self::Failed { driver, .. } => driver,
        }
    }
}
