//! Ordered configuration sources and the builder that layers them

use crate::command_line::CommandLineSource;
use crate::env::EnvironmentVariablesSource;
use crate::file::{user_secrets_path, FileSource};
use crate::root::Configuration;
use driveline_errors::{ConfigError, Error};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A provider of key/value pairs.
///
/// Sources are loaded once, in registration order, when the owning
/// [`ConfigurationBuilder`] is built.
pub trait ConfigurationSource: Send + Sync {
    /// Short description used in logs
    fn describe(&self) -> String;

    /// Produce the pairs contributed by this source.
    ///
    /// `base_path` is the directory relative file paths resolve against.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the source cannot be read or parsed.
    fn load(&self, base_path: Option<&Path>) -> Result<Vec<(String, String)>, ConfigError>;
}

/// Fixed pairs held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pairs: Vec<(String, String)>,
}

impl MemorySource {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigurationSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} keys)", self.pairs.len())
    }

    fn load(&self, _base_path: Option<&Path>) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(self.pairs.clone())
    }
}

/// An already-built configuration re-used as a layer
#[derive(Debug, Clone)]
pub struct ChainedSource {
    configuration: Configuration,
}

impl ChainedSource {
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }
}

impl ConfigurationSource for ChainedSource {
    fn describe(&self) -> String {
        format!("chained configuration ({} keys)", self.configuration.len())
    }

    fn load(&self, _base_path: Option<&Path>) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(self
            .configuration
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}

/// Collects sources and resolves them into a [`Configuration`]
#[derive(Default)]
pub struct ConfigurationBuilder {
    sources: Vec<Box<dyn ConfigurationSource>>,
    base_path: Option<PathBuf>,
}

impl ConfigurationBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; it overrides every source added before it
    pub fn add_source(&mut self, source: impl ConfigurationSource + 'static) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Directory relative file sources resolve against
    pub fn set_base_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.base_path = Some(path.into());
        self
    }

    /// Current base path, if any
    #[must_use]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Registered sources, in order
    #[must_use]
    pub fn sources(&self) -> &[Box<dyn ConfigurationSource>] {
        &self.sources
    }

    /// Add in-memory pairs
    pub fn add_in_memory<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add_source(MemorySource::new(pairs))
    }

    /// Add every key of an existing configuration
    pub fn add_configuration(&mut self, configuration: Configuration) -> &mut Self {
        self.add_source(ChainedSource::new(configuration))
    }

    /// Add environment variables, optionally restricted to a prefix
    pub fn add_env_vars(&mut self, prefix: Option<&str>) -> &mut Self {
        self.add_source(EnvironmentVariablesSource::new(prefix))
    }

    /// Add command-line arguments
    pub fn add_command_line<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_source(CommandLineSource::new(args))
    }

    /// Add a TOML or JSON settings file
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an empty path and a
    /// `ConfigError` when the extension is not recognized.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        optional: bool,
        reload_on_change: bool,
    ) -> Result<&mut Self, Error> {
        let source = FileSource::new(path.as_ref(), optional, reload_on_change)?;
        Ok(self.add_source(source))
    }

    /// Add the per-user secrets file of `application`
    ///
    /// A missing user configuration directory is tolerated when `optional`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the secrets location cannot be
    /// determined and the source is required.
    pub fn add_user_secrets(
        &mut self,
        application: &str,
        optional: bool,
        reload_on_change: bool,
    ) -> Result<&mut Self, Error> {
        match user_secrets_path(application) {
            Some(path) => self.add_file(path, optional, reload_on_change),
            None if optional => {
                debug!(application, "no user configuration directory, skipping user secrets");
                Ok(self)
            }
            None => Err(ConfigError::NotFound {
                path: format!("user secrets for {application}"),
            }
            .into()),
        }
    }

    /// Load every source in order; later keys overwrite earlier ones
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` raised by a source.
    pub fn build(&self) -> Result<Configuration, ConfigError> {
        let mut entries = Vec::new();
        for source in &self.sources {
            let pairs = source.load(self.base_path.as_deref())?;
            debug!(source = %source.describe(), keys = pairs.len(), "configuration source loaded");
            entries.extend(pairs);
        }
        Ok(Configuration::from_entries(entries))
    }
}

impl fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationBuilder")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.describe()).collect::<Vec<_>>(),
            )
            .field("base_path", &self.base_path)
            .finish()
    }
}
