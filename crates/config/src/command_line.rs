//! Command-line argument source
//!
//! Recognized forms:
//! - `--key=value`, `/key=value`, `key=value`
//! - `--key value`, `/key value` (the next argument is the value)
//! - `-k value` / `-k=value` only when `-k` has a switch mapping
//!
//! Anything else is skipped.

use crate::builder::ConfigurationSource;
use driveline_errors::ConfigError;
use driveline_types::eq_ignore_case;
use std::path::Path;

/// Parses arguments into configuration pairs
#[derive(Debug, Clone, Default)]
pub struct CommandLineSource {
    args: Vec<String>,
    switch_mappings: Vec<(String, String)>,
}

impl CommandLineSource {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            switch_mappings: Vec::new(),
        }
    }

    /// Map a switch such as `-e` or `--env` to a configuration key
    #[must_use]
    pub fn with_switch_mapping(mut self, switch: impl Into<String>, key: impl Into<String>) -> Self {
        self.switch_mappings.push((switch.into(), key.into()));
        self
    }

    fn mapped(&self, switch: &str) -> Option<&str> {
        self.switch_mappings
            .iter()
            .find(|(s, _)| eq_ignore_case(s, switch))
            .map(|(_, key)| key.as_str())
    }

    /// Parse the arguments into ordered pairs
    #[must_use]
    pub fn parse(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut args = self.args.iter();

        while let Some(raw) = args.next() {
            let arg = match raw.strip_prefix('/') {
                Some(rest) => format!("--{rest}"),
                None => raw.clone(),
            };
            let key_start = if arg.starts_with("--") {
                2
            } else if arg.starts_with('-') {
                1
            } else {
                0
            };

            let (key, value) = if let Some(separator) = arg.find('=') {
                let switch = &arg[..separator];
                let key = match self.mapped(switch) {
                    Some(mapped) => mapped.to_string(),
                    None if key_start == 1 => continue,
                    None => arg[key_start..separator].to_string(),
                };
                (key, arg[separator + 1..].to_string())
            } else {
                if key_start == 0 {
                    continue;
                }
                let key = match self.mapped(&arg) {
                    Some(mapped) => mapped.to_string(),
                    None if key_start == 1 => continue,
                    None => arg[key_start..].to_string(),
                };
                let Some(value) = args.next() else {
                    continue;
                };
                (key, value.clone())
            };

            if key.is_empty() {
                continue;
            }
            pairs.push((key, value));
        }

        pairs
    }
}

impl ConfigurationSource for CommandLineSource {
    fn describe(&self) -> String {
        format!("command line ({} args)", self.args.len())
    }

    fn load(&self, _base_path: Option<&Path>) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(self.parse())
    }
}
