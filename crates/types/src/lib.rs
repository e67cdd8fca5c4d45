#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for driveline
//!
//! This crate provides the small value types shared by the configuration,
//! container and host crates: captured command-line arguments, well-known
//! environment names and the bootstrap configuration keys.

pub mod args;
pub mod environment;

pub use args::CommandLineArguments;
pub use environment::EnvironmentName;

/// Bootstrap configuration keys recognized while resolving the environment
pub mod keys {
    /// Application name key
    pub const APPLICATION: &str = "applicationName";
    /// Environment name key
    pub const ENVIRONMENT: &str = "environment";
    /// Content root key
    pub const CONTENT_ROOT: &str = "contentRoot";
    /// Toggle handed to file-based sources by the default wiring
    pub const RELOAD_CONFIG_ON_CHANGE: &str = "consoleDrivingBuilder:reloadConfigOnChange";
}

/// Case-insensitive string equality using Unicode lower-case folding.
///
/// Used for configuration keys and environment names alike.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Development", "development"));
        assert!(eq_ignore_case("ÄPFEL", "äpfel"));
        assert!(!eq_ignore_case("Develop", "Development"));
        assert!(eq_ignore_case("", ""));
    }
}
