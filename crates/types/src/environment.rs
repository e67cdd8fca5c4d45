//! Well-known environment names

use crate::eq_ignore_case;

/// The three environment names the host gives special meaning to.
///
/// Any other string is accepted as a custom environment.
pub struct EnvironmentName;

impl EnvironmentName {
    pub const DEVELOPMENT: &'static str = "Development";
    pub const STAGING: &'static str = "Staging";
    pub const PRODUCTION: &'static str = "Production";

    /// Whether `name` is one of the three well-known names (case-insensitive)
    #[must_use]
    pub fn is_well_known(name: &str) -> bool {
        [Self::DEVELOPMENT, Self::STAGING, Self::PRODUCTION]
            .iter()
            .any(|known| eq_ignore_case(known, name))
    }
}
