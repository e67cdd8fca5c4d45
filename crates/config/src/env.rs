//! Environment-variable source

use crate::builder::ConfigurationSource;
use crate::constants::{ENV_KEY_DELIMITER, KEY_DELIMITER};
use driveline_errors::ConfigError;
use driveline_types::eq_ignore_case;
use std::path::Path;

/// Reads environment variables, optionally keeping only those that start
/// with a prefix. The prefix is stripped and `__` becomes `:`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariablesSource {
    prefix: Option<String>,
    vars: Option<Vec<(String, String)>>,
}

impl EnvironmentVariablesSource {
    /// Read from the process environment at build time
    #[must_use]
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            vars: None,
        }
    }

    /// Read from an explicit variable set instead of the process environment
    pub fn from_vars<I, K, V>(prefix: Option<&str>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        match &self.prefix {
            None => Some(name),
            Some(prefix) => {
                let head = name.get(..prefix.len())?;
                eq_ignore_case(head, prefix).then(|| &name[prefix.len()..])
            }
        }
    }

    fn snapshot(&self) -> Vec<(String, String)> {
        match &self.vars {
            Some(vars) => vars.clone(),
            // Variables that are not valid UTF-8 cannot be addressed by key.
            None => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }
}

impl ConfigurationSource for EnvironmentVariablesSource {
    fn describe(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("environment variables ({prefix}*)"),
            None => "environment variables".to_string(),
        }
    }

    fn load(&self, _base_path: Option<&Path>) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter_map(|(name, value)| {
                let key = self.strip(&name)?;
                if key.is_empty() {
                    return None;
                }
                Some((key.replace(ENV_KEY_DELIMITER, KEY_DELIMITER), value))
            })
            .collect())
    }
}
