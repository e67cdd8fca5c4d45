use serde::{Deserialize, Serialize};

/// Events not tied to one driver or to the run lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    Warning {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },

    DebugLog { message: String },

    /// One configuration pass (`host` or `app`) finished with `keys` entries
    ConfigurationLoaded { pass: String, keys: usize },
}

impl GeneralEvent {
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn configuration_loaded(pass: impl Into<String>, keys: usize) -> Self {
        Self::ConfigurationLoaded {
            pass: pass.into(),
            keys,
        }
    }
}
