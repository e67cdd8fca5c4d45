//! Conventional wiring for console applications

use driveline_config::Configuration;
use driveline_types::keys;
use tracing::warn;

use crate::builder::ConsoleDriverBuilder;
use crate::logging::{bind_logging_options, LoggingOptions};

/// Prefix of environment variables read into the bootstrap configuration
pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "DRIVELINE_";

/// Base name of the settings files loaded from the content root
pub const SETTINGS_FILE_STEM: &str = "appsettings";

const SETTINGS_EXTENSIONS: [&str; 2] = ["toml", "json"];

/// A builder with [`ConsoleDriverBuilder::configure_defaults`] applied
pub fn create_default_builder<I, S>(args: I) -> ConsoleDriverBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut builder = ConsoleDriverBuilder::new(args);
    builder.configure_defaults();
    builder
}

impl ConsoleDriverBuilder {
    /// Apply the conventional sources, logging, and container settings:
    ///
    /// - content root: the current working directory
    /// - bootstrap configuration: `DRIVELINE_*` environment variables, then
    ///   the command line
    /// - app configuration: `appsettings.{toml,json}`, then
    ///   `appsettings.{Environment}.{toml,json}` (all optional), user secrets
    ///   in Development when an application name is set, every environment
    ///   variable, then the command line
    /// - logging enabled and bound from the `Logging` section
    /// - container validation on build in Development
    pub fn configure_defaults(&mut self) -> &mut Self {
        match std::env::current_dir() {
            Ok(dir) => {
                let dir = dir.to_string_lossy().into_owned();
                self.configure_host_configuration(move |config| {
                    config.add_in_memory([(keys::CONTENT_ROOT, dir)]);
                    Ok(())
                });
            }
            Err(e) => warn!(error = %e, "working directory unavailable, content root left unset"),
        }

        let args = self.args().clone();
        self.configure_host_configuration(move |config| {
            config
                .add_env_vars(Some(ENVIRONMENT_VARIABLE_PREFIX))
                .add_command_line(args.iter().cloned());
            Ok(())
        });

        let args = self.args().clone();
        self.configure_app_configuration(move |context, config| {
            let reload = context
                .configuration()
                .get_bool(keys::RELOAD_CONFIG_ON_CHANGE, true)?;
            let environment = context.environment();

            for ext in SETTINGS_EXTENSIONS {
                config.add_file(format!("{SETTINGS_FILE_STEM}.{ext}"), true, reload)?;
            }
            for ext in SETTINGS_EXTENSIONS {
                config.add_file(
                    format!("{SETTINGS_FILE_STEM}.{}.{ext}", environment.environment_name()),
                    true,
                    reload,
                )?;
            }
            if environment.is_development() {
                let application = environment.application_name().filter(|name| !name.is_empty());
                if let Some(application) = application {
                    config.add_user_secrets(application, true, reload)?;
                }
            }
            config.add_env_vars(None).add_command_line(args.iter().cloned());
            Ok(())
        });

        self.configure_services(|_, services| {
            services
                .configure::<LoggingOptions, _>(|options| options.enabled = true)
                .configure_with::<LoggingOptions, _>(|provider, options| {
                    let configuration = provider.get_required::<Configuration>()?;
                    bind_logging_options(&configuration, options)
                });
            Ok(())
        });

        self.use_default_service_provider(|context, options| {
            options.validate_on_build = context.environment().is_development();
        })
    }
}
