//! Demo drivers registered by the CLI

use async_trait::async_trait;
use driveline_config::Configuration;
use driveline_errors::{DriverError, Result};
use driveline_host::{CancellationToken, Driver, HostEnvironment};
use driveline_types::CommandLineArguments;
use std::sync::Arc;
use std::time::Duration;

/// Prints `Greeting:Message` along with the resolved environment
pub struct GreetingDriver {
    configuration: Arc<Configuration>,
    environment: Arc<HostEnvironment>,
}

impl GreetingDriver {
    pub fn new(configuration: Arc<Configuration>, environment: Arc<HostEnvironment>) -> Self {
        Self {
            configuration,
            environment,
        }
    }

    fn message(&self) -> String {
        let greeting = self
            .configuration
            .get("Greeting:Message")
            .unwrap_or("Hello");
        let application = self.environment.application_name().unwrap_or("driveline");
        format!(
            "{greeting} from {application} ({}, content root {})",
            self.environment.environment_name(),
            self.environment.content_root_path().display()
        )
    }
}

#[async_trait]
impl Driver for GreetingDriver {
    fn name(&self) -> &str {
        "greeting"
    }

    async fn execute(&self, _args: &CommandLineArguments, _cancel: CancellationToken) -> Result<i32> {
        println!("{}", self.message());
        Ok(0)
    }
}

/// Waits `Demo:DelayMs`, then returns `Demo:ExitCode`.
///
/// Cancellation during the wait fails the driver.
pub struct ExitCodeDriver {
    configuration: Arc<Configuration>,
}

impl ExitCodeDriver {
    pub fn new(configuration: Arc<Configuration>) -> Self {
        Self { configuration }
    }
}

#[async_trait]
impl Driver for ExitCodeDriver {
    fn name(&self) -> &str {
        "exit-code"
    }

    async fn execute(&self, args: &CommandLineArguments, cancel: CancellationToken) -> Result<i32> {
        let delay = self.configuration.get_parsed::<u64>("Demo:DelayMs")?.unwrap_or(0);
        let code = self.configuration.get_parsed::<i32>("Demo:ExitCode")?.unwrap_or(0);
        tracing::debug!(delay, code, args = args.len(), "exit-code driver waiting");

        tokio::select! {
            () = cancel.cancelled() => Err(DriverError::Cancelled {
                driver: self.name().to_string(),
            }
            .into()),
            () = tokio::time::sleep(Duration::from_millis(delay)) => Ok(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveline_errors::Error;

    fn environment() -> Arc<HostEnvironment> {
        Arc::new(HostEnvironment::from_configuration(
            &Configuration::from_pairs([("environment", "Staging"), ("applicationName", "demo")]),
            std::path::Path::new("/srv/app"),
        ))
    }

    #[test]
    fn test_greeting_uses_configuration() {
        let configuration = Arc::new(Configuration::from_pairs([("Greeting:Message", "Hi")]));
        let driver = GreetingDriver::new(configuration, environment());
        assert_eq!(driver.message(), "Hi from demo (Staging, content root /srv/app)");
    }

    #[tokio::test]
    async fn test_exit_code_from_configuration() {
        let configuration = Arc::new(Configuration::from_pairs([("Demo:ExitCode", "4")]));
        let driver = ExitCodeDriver::new(configuration);
        let code = driver
            .execute(&CommandLineArguments::default(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(code, 4);
    }

    #[tokio::test]
    async fn test_exit_code_driver_observes_cancellation() {
        let configuration = Arc::new(Configuration::from_pairs([("Demo:DelayMs", "60000")]));
        let driver = ExitCodeDriver::new(configuration);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = driver
            .execute(&CommandLineArguments::default(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_invalid_exit_code_is_a_configuration_error() {
        let configuration = Arc::new(Configuration::from_pairs([("Demo:ExitCode", "three")]));
        let driver = ExitCodeDriver::new(configuration);
        let err = driver
            .execute(&CommandLineArguments::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
