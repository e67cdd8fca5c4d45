use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use driveline_errors::UserFacingError;

pub mod driver;
pub mod general;
pub mod host;

pub use driver::*;
pub use general::*;
pub use host::*;

/// Serializable snapshot of a [`UserFacingError`].
///
/// Errors themselves stay inside the process; listeners get this instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(str::to_owned),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(str::to_owned),
            retryable: error.is_retryable(),
        }
    }
}

/// Every event a console driver can report, tagged by domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    General(GeneralEvent),
    Host(HostEvent),
    Driver(DriverEvent),
}

impl AppEvent {
    #[must_use]
    pub fn source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Host(_) => EventSource::HOST,
            Self::Driver(_) => EventSource::DRIVER,
        }
    }

    /// Lifecycle chatter is debug; problems are warn or error; the rest is info
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::Error { .. }) | Self::Driver(DriverEvent::Failed { .. }) => {
                EventLevel::Error
            }
            Self::General(GeneralEvent::Warning { .. }) => EventLevel::Warn,
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Host(_)
            | Self::Driver(DriverEvent::Started { .. }) => EventLevel::Debug,
            Self::General(GeneralEvent::ConfigurationLoaded { .. })
            | Self::Driver(DriverEvent::Completed { .. }) => EventLevel::Info,
        }
    }
}
