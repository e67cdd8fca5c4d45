//! Logging options and subscriber installation

use std::str::FromStr;

use driveline_config::Configuration;
use driveline_errors::{ConfigError, Result};
use tracing_subscriber::EnvFilter;

/// Configuration section the options are bound from
pub const LOGGING_SECTION: &str = "Logging";

/// Output layout of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: format!("{LOGGING_SECTION}:Format"),
                value: s.to_string(),
            }),
        }
    }
}

/// How the global tracing subscriber is installed after build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Install a subscriber at all
    pub enabled: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Translate a level name into an `EnvFilter` level.
///
/// Accepts tracing names and the long forms used by settings files
/// (`Information`, `Warning`, `Critical`, `None`).
fn level_directive(key: &str, raw: &str) -> std::result::Result<&'static str, ConfigError> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" | "information" => "info",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        "off" | "none" => "off",
        _ => {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            })
        }
    };
    Ok(level)
}

/// Apply the `Logging` section of `configuration` to `options`.
///
/// `Logging:LogLevel:Default` sets the default level and every other child
/// of `Logging:LogLevel` becomes a `target=level` directive.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for unknown levels or formats and
/// non-boolean `Logging:Enabled` values.
pub fn bind_logging_options(configuration: &Configuration, options: &mut LoggingOptions) -> Result<()> {
    let section = configuration.section(LOGGING_SECTION);
    if !section.exists() {
        return Ok(());
    }

    options.enabled = section.get_bool("Enabled", options.enabled)?;
    if let Some(format) = section.get("Format") {
        options.format = format.parse()?;
    }

    let levels = section.section("LogLevel");
    let mut directives = Vec::new();
    let mut default = None;
    for child in levels.children() {
        let Some(raw) = child.value() else {
            continue;
        };
        let level = level_directive(child.path(), raw)?;
        if child.key().eq_ignore_ascii_case("Default") {
            default = Some(level);
        } else {
            directives.push(format!("{}={level}", child.key()));
        }
    }
    if default.is_some() || !directives.is_empty() {
        let default = default.map_or_else(|| base_level(&options.filter), str::to_string);
        directives.insert(0, default);
        options.filter = directives.join(",");
    }
    Ok(())
}

/// First directive of a filter when it is a bare level
fn base_level(filter: &str) -> String {
    filter
        .split(',')
        .next()
        .filter(|d| !d.contains('='))
        .unwrap_or("info")
        .to_string()
}

/// Install the global subscriber described by `options`.
///
/// `RUST_LOG` wins over the configured filter. Returns `false` when logging
/// is disabled or another subscriber is already installed.
pub fn init_tracing(options: &LoggingOptions) -> bool {
    if !options.enabled {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    let installed = match options.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveline_errors::Error;

    #[test]
    fn test_binds_levels_format_and_switch() {
        let config = Configuration::from_pairs([
            ("Logging:Enabled", "true"),
            ("Logging:Format", "JSON"),
            ("Logging:LogLevel:Default", "Warning"),
            ("Logging:LogLevel:driveline_host", "Debug"),
        ]);
        let mut options = LoggingOptions::default();
        bind_logging_options(&config, &mut options).unwrap();
        assert!(options.enabled);
        assert_eq!(options.format, LogFormat::Json);
        assert_eq!(options.filter, "warn,driveline_host=debug");
    }

    #[test]
    fn test_missing_section_leaves_options_untouched() {
        let mut options = LoggingOptions {
            enabled: true,
            ..LoggingOptions::default()
        };
        bind_logging_options(&Configuration::empty(), &mut options).unwrap();
        assert_eq!(
            options,
            LoggingOptions {
                enabled: true,
                ..LoggingOptions::default()
            }
        );
    }

    #[test]
    fn test_target_levels_keep_existing_default() {
        let config = Configuration::from_pairs([("Logging:LogLevel:hyper", "None")]);
        let mut options = LoggingOptions {
            filter: "debug".into(),
            ..LoggingOptions::default()
        };
        bind_logging_options(&config, &mut options).unwrap();
        assert_eq!(options.filter, "debug,hyper=off");
    }

    #[test]
    fn test_rejects_unknown_values() {
        let mut options = LoggingOptions::default();
        let bad_level = Configuration::from_pairs([("Logging:LogLevel:Default", "loud")]);
        assert!(matches!(
            bind_logging_options(&bad_level, &mut options),
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
        let bad_format = Configuration::from_pairs([("Logging:Format", "xml")]);
        assert!(bind_logging_options(&bad_format, &mut options).is_err());
    }

    #[test]
    fn test_disabled_options_install_nothing() {
        assert!(!init_tracing(&LoggingOptions::default()));
    }
}
