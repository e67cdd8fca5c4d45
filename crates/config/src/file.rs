//! TOML and JSON settings files

use crate::builder::ConfigurationSource;
use crate::constants::{KEY_DELIMITER, USER_SECRETS_DIR, USER_SECRETS_FILE};
use driveline_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// A settings file flattened into `section:key` pairs.
///
/// Nested tables become `:`-joined keys and array items use their index as
/// the last segment. The file is read when the owning builder is built.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
    optional: bool,
    reload_on_change: bool,
}

impl FileSource {
    /// Describe a settings file
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an empty path and
    /// `ConfigError::UnsupportedFormat` for an unknown extension.
    pub fn new(path: &Path, optional: bool, reload_on_change: bool) -> Result<Self, Error> {
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("path", "file path must not be empty"));
        }
        let format = FileFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.display().to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            optional,
            reload_on_change,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn format(&self) -> FileFormat {
        self.format
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the caller asked for reload-on-change.
    ///
    /// Recorded only; files are read once per build.
    #[must_use]
    pub fn reload_on_change(&self) -> bool {
        self.reload_on_change
    }

    fn resolve(&self, base_path: Option<&Path>) -> PathBuf {
        match base_path {
            Some(base) if self.path.is_relative() => base.join(&self.path),
            _ => self.path.clone(),
        }
    }
}

impl ConfigurationSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn load(&self, base_path: Option<&Path>) -> Result<Vec<(String, String)>, ConfigError> {
        let path = self.resolve(base_path);
        let shown = path.display().to_string();

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.optional {
                    debug!(path = %shown, "optional settings file not found");
                    return Ok(Vec::new());
                }
                return Err(ConfigError::NotFound { path: shown });
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: shown,
                    message: e.to_string(),
                })
            }
        };

        let mut pairs = Vec::new();
        match self.format {
            FileFormat::Toml => {
                let value: toml::Value =
                    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                        path: shown.clone(),
                        message: e.to_string(),
                    })?;
                flatten_toml(None, &value, &mut pairs);
            }
            FileFormat::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                        path: shown.clone(),
                        message: e.to_string(),
                    })?;
                flatten_json(None, &value, &mut pairs);
            }
        }
        Ok(pairs)
    }
}

fn child_key(prefix: Option<&str>, segment: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}{KEY_DELIMITER}{segment}"),
        None => segment.to_string(),
    }
}

fn flatten_toml(prefix: Option<&str>, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                flatten_toml(Some(&child_key(prefix, key)), child, out);
            }
        }
        toml::Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_toml(Some(&child_key(prefix, &index.to_string())), child, out);
            }
        }
        toml::Value::String(s) => push(prefix, s.clone(), out),
        other => push(prefix, other.to_string(), out),
    }
}

fn flatten_json(prefix: Option<&str>, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                flatten_json(Some(&child_key(prefix, key)), child, out);
            }
        }
        serde_json::Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_json(Some(&child_key(prefix, &index.to_string())), child, out);
            }
        }
        serde_json::Value::Null => push(prefix, String::new(), out),
        serde_json::Value::String(s) => push(prefix, s.clone(), out),
        other => push(prefix, other.to_string(), out),
    }
}

fn push(key: Option<&str>, value: String, out: &mut Vec<(String, String)>) {
    // A scalar document has no key to store it under.
    if let Some(key) = key {
        out.push((key.to_string(), value));
    }
}

/// Location of the per-user secrets file for `application`
#[must_use]
pub fn user_secrets_path(application: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(USER_SECRETS_DIR)
            .join(application)
            .join(USER_SECRETS_FILE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            FileFormat::from_path(Path::new("appsettings.TOML")),
            Some(FileFormat::Toml)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("a/b/appsettings.Development.json")),
            Some(FileFormat::Json)
        );
        assert_eq!(FileFormat::from_path(Path::new("settings.yaml")), None);
        assert_eq!(FileFormat::from_path(Path::new("settings")), None);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = FileSource::new(Path::new("settings.ini"), true, false).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_flatten_json() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{"Logging":{"LogLevel":{"Default":"warn"},"Enabled":true},"hosts":["a","b"],"none":null}"#,
        )
        .unwrap();
        let mut pairs = Vec::new();
        flatten_json(None, &value, &mut pairs);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("Logging:Enabled".to_string(), "true".to_string()),
                ("Logging:LogLevel:Default".to_string(), "warn".to_string()),
                ("hosts:0".to_string(), "a".to_string()),
                ("hosts:1".to_string(), "b".to_string()),
                ("none".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_flatten_toml() {
        let value: toml::Value = toml::from_str(
            "retries = 3\n[Logging]\nFormat = \"json\"\n[Logging.LogLevel]\nDefault = \"debug\"\n",
        )
        .unwrap();
        let mut pairs = Vec::new();
        flatten_toml(None, &value, &mut pairs);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("Logging:Format".to_string(), "json".to_string()),
                ("Logging:LogLevel:Default".to_string(), "debug".to_string()),
                ("retries".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_user_secrets_path_layout() {
        if let Some(path) = user_secrets_path("demo") {
            assert!(path.ends_with("driveline/user-secrets/demo/secrets.json"));
        }
    }
}
