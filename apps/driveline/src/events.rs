//! Lifecycle event display

use driveline_events::{AppEvent, DriverEvent, EventMessage, EventReceiver, GeneralEvent, HostEvent};
use std::io::{self, Write};

/// Renders lifecycle events on stderr, as text or JSON lines
#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    json: bool,
    debug: bool,
}

impl EventHandler {
    pub fn new(json: bool, debug: bool) -> Self {
        Self { json, debug }
    }

    /// Drain `receiver` until every sender is gone
    pub async fn run(self, mut receiver: EventReceiver) -> io::Result<()> {
        while let Some(message) = receiver.recv().await {
            self.handle_event(&message)?;
        }
        Ok(())
    }

    fn handle_event(&self, message: &EventMessage) -> io::Result<()> {
        let line = if self.json {
            Some(serde_json::to_string(message).map_err(io::Error::other)?)
        } else {
            self.render(&message.event)
        };
        match line {
            Some(line) => writeln!(io::stderr().lock(), "{line}"),
            None => Ok(()),
        }
    }

    /// Text form of an event; `None` when it is only shown with `--debug`
    fn render(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => Some(match context {
                Some(context) => format!("warning: {message} ({context})"),
                None => format!("warning: {message}"),
            }),
            AppEvent::General(GeneralEvent::Error { message, details }) => Some(match details {
                Some(details) => format!("error: {message}\n  {details}"),
                None => format!("error: {message}"),
            }),
            AppEvent::Driver(DriverEvent::Failed { driver, failure }) => {
                let mut line = format!("driver {driver} failed: {}", failure.message);
                if let Some(hint) = &failure.hint {
                    line.push_str(&format!("\n  Hint: {hint}"));
                }
                Some(line)
            }
            AppEvent::Driver(DriverEvent::Completed { driver, exit_code }) if *exit_code != 0 => {
                Some(format!("driver {driver} exited with code {exit_code}"))
            }
            _ if !self.debug => None,
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) => Some(format!("debug: {message}")),
            AppEvent::General(GeneralEvent::ConfigurationLoaded { pass, keys }) => {
                Some(format!("{pass} configuration loaded ({keys} keys)"))
            }
            AppEvent::Host(HostEvent::Starting { drivers }) => Some(format!("starting {drivers} driver(s)")),
            AppEvent::Host(HostEvent::Stopped { exit_code }) => Some(format!("stopped with exit code {exit_code}")),
            AppEvent::Host(HostEvent::Disposed) => Some("services disposed".to_string()),
            AppEvent::Driver(DriverEvent::Started { driver, index }) => {
                Some(format!("driver {driver} started (#{index})"))
            }
            AppEvent::Driver(DriverEvent::Completed { driver, .. }) => Some(format!("driver {driver} completed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveline_events::FailureContext;

    #[test]
    fn test_quiet_mode_shows_only_problems() {
        let handler = EventHandler::new(false, false);
        assert!(handler.render(&AppEvent::Host(HostEvent::starting(2))).is_none());
        assert!(handler
            .render(&AppEvent::Driver(DriverEvent::completed("a", 0)))
            .is_none());
        assert_eq!(
            handler
                .render(&AppEvent::Driver(DriverEvent::completed("a", 3)))
                .as_deref(),
            Some("driver a exited with code 3")
        );

        let failure = FailureContext::new(None::<String>, "boom", Some("check the logs"), false);
        let line = handler
            .render(&AppEvent::Driver(DriverEvent::failed("b", failure)))
            .unwrap();
        assert!(line.starts_with("driver b failed: boom"));
        assert!(line.contains("Hint: check the logs"));
    }

    #[test]
    fn test_debug_mode_shows_lifecycle() {
        let handler = EventHandler::new(false, true);
        assert_eq!(
            handler.render(&AppEvent::Host(HostEvent::stopped(0))).as_deref(),
            Some("stopped with exit code 0")
        );
        assert_eq!(
            handler
                .render(&AppEvent::Driver(DriverEvent::started("a", 1)))
                .as_deref(),
            Some("driver a started (#1)")
        );
    }
}
