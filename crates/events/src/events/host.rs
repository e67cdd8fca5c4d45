use serde::{Deserialize, Serialize};

/// Process-level lifecycle of a built console driver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    /// Driver execution is about to begin
    Starting { drivers: usize },

    /// Every driver has finished or the run was aborted
    Stopped { exit_code: i32 },

    /// Registered services were released
    Disposed,
}

impl HostEvent {
    #[must_use]
    pub fn starting(drivers: usize) -> Self {
        Self::Starting { drivers }
    }

    #[must_use]
    pub fn stopped(exit_code: i32) -> Self {
        Self::Stopped { exit_code }
    }
}
