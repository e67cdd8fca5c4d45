//! Environment descriptor and content-root resolution

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use driveline_config::Configuration;
use driveline_types::{eq_ignore_case, keys, EnvironmentName};

use crate::file_provider::{FileProvider, PhysicalFileProvider};

/// Resolve the content root from its raw configured value.
///
/// Empty or absent values fall back to `base`, absolute values are kept, and
/// relative values are joined onto `base`.
#[must_use]
pub fn resolve_content_root(raw: Option<&str>, base: &Path) -> PathBuf {
    match raw {
        None | Some("") => base.to_path_buf(),
        Some(raw) => {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        }
    }
}

/// Where and as what the application runs
#[derive(Clone)]
pub struct HostEnvironment {
    environment_name: String,
    application_name: Option<String>,
    content_root_path: PathBuf,
    content_root_provider: Arc<dyn FileProvider>,
}

impl HostEnvironment {
    /// Derive the environment from bootstrap configuration
    #[must_use]
    pub fn from_configuration(configuration: &Configuration, base_directory: &Path) -> Self {
        let environment_name = configuration
            .get(keys::ENVIRONMENT)
            .unwrap_or(EnvironmentName::PRODUCTION)
            .to_string();
        let application_name = configuration
            .get(keys::APPLICATION)
            .map(str::to_string);
        let content_root_path =
            resolve_content_root(configuration.get(keys::CONTENT_ROOT), base_directory);
        Self::new(environment_name, application_name, content_root_path)
    }

    pub fn new(
        environment_name: impl Into<String>,
        application_name: Option<String>,
        content_root_path: impl Into<PathBuf>,
    ) -> Self {
        let content_root_path = content_root_path.into();
        Self {
            environment_name: environment_name.into(),
            application_name,
            content_root_provider: Arc::new(PhysicalFileProvider::new(&content_root_path)),
            content_root_path,
        }
    }

    #[must_use]
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }

    #[must_use]
    pub fn application_name(&self) -> Option<&str> {
        self.application_name.as_deref()
    }

    #[must_use]
    pub fn content_root_path(&self) -> &Path {
        &self.content_root_path
    }

    /// File access rooted at the content root
    #[must_use]
    pub fn content_root_provider(&self) -> &Arc<dyn FileProvider> {
        &self.content_root_provider
    }

    /// Case-insensitive comparison against any environment name
    #[must_use]
    pub fn is_environment(&self, name: &str) -> bool {
        eq_ignore_case(&self.environment_name, name)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.is_environment(EnvironmentName::DEVELOPMENT)
    }

    #[must_use]
    pub fn is_staging(&self) -> bool {
        self.is_environment(EnvironmentName::STAGING)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.is_environment(EnvironmentName::PRODUCTION)
    }
}

impl fmt::Debug for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEnvironment")
            .field("environment_name", &self.environment_name)
            .field("application_name", &self.application_name)
            .field("content_root_path", &self.content_root_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_when_keys_absent() {
        let env = HostEnvironment::from_configuration(&Configuration::empty(), Path::new("/srv/app"));
        assert_eq!(env.environment_name(), "Production");
        assert!(env.is_production());
        assert_eq!(env.application_name(), None);
        assert_eq!(env.content_root_path(), Path::new("/srv/app"));
        assert_eq!(env.content_root_provider().root(), Path::new("/srv/app"));
    }

    #[test]
    fn test_reads_bootstrap_keys_case_insensitively() {
        let config = Configuration::from_pairs([
            ("ENVIRONMENT", "development"),
            ("applicationname", "demo"),
            ("ContentRoot", "content"),
        ]);
        let env = HostEnvironment::from_configuration(&config, Path::new("/srv/app"));
        assert!(env.is_development());
        assert!(!env.is_staging());
        assert_eq!(env.application_name(), Some("demo"));
        assert_eq!(env.content_root_path(), Path::new("/srv/app/content"));
    }

    #[test]
    fn test_empty_values_are_kept_as_given() {
        let config = Configuration::from_pairs([("environment", ""), ("applicationName", "")]);
        let env = HostEnvironment::from_configuration(&config, Path::new("/srv/app"));
        assert_eq!(env.environment_name(), "");
        assert!(!env.is_production());
        assert_eq!(env.application_name(), Some(""));
        assert_eq!(env.content_root_path(), Path::new("/srv/app"));
    }

    #[test]
    fn test_custom_environment_names() {
        let env = HostEnvironment::new("QA-East", None, "/tmp");
        assert!(env.is_environment("qa-east"));
        assert!(!env.is_production());
    }

    #[test]
    fn test_nonexistent_content_root_is_not_checked_eagerly() {
        let env = HostEnvironment::new("Production", None, "/definitely/not/here");
        assert_eq!(env.content_root_path(), Path::new("/definitely/not/here"));
    }

    proptest! {
        #[test]
        fn prop_relative_roots_join_base(segments in proptest::collection::vec("[a-z0-9_]{1,8}", 1..4)) {
            let raw = segments.join("/");
            let base = Path::new("/srv/app");
            prop_assert_eq!(resolve_content_root(Some(&raw), base), base.join(&raw));
        }

        #[test]
        fn prop_absolute_roots_are_kept(segments in proptest::collection::vec("[a-z0-9_]{1,8}", 0..4)) {
            let raw = format!("/{}", segments.join("/"));
            prop_assert_eq!(
                resolve_content_root(Some(&raw), Path::new("/srv/app")),
                PathBuf::from(&raw)
            );
        }
    }

    #[test]
    fn test_empty_root_falls_back_to_base() {
        let base = Path::new("/srv/app");
        assert_eq!(resolve_content_root(None, base), base);
        assert_eq!(resolve_content_root(Some(""), base), base);
    }
}
