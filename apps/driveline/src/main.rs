//! driveline - demo console application
//!
//! Builds a console driver from the default wiring (settings files,
//! environment variables, command line) and runs two demo drivers. The
//! process exits with the aggregated driver exit code.

mod cli;
mod drivers;
mod error;
mod events;

use crate::cli::Cli;
use crate::drivers::{ExitCodeDriver, GreetingDriver};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use driveline_config::Configuration;
use driveline_host::{
    create_default_builder, CancellationToken, ConsoleDriverBuilder, Driver, HostEnvironment, LogFormat,
};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Build the console driver, run it, and return its exit code
async fn run(cli: Cli) -> Result<i32, CliError> {
    let (event_sender, event_receiver) = driveline_events::channel();
    let handler = tokio::spawn(EventHandler::new(cli.json, cli.debug).run(event_receiver));

    let mut builder = create_default_builder(cli.args.iter().cloned());
    apply_cli_overrides(&mut builder, &cli)?;
    builder
        .use_event_sender(event_sender)
        .add_driver_factory(|services| {
            let greeting: Arc<dyn Driver> = Arc::new(GreetingDriver::new(
                services.get_required::<Configuration>()?,
                services.get_required::<HostEnvironment>()?,
            ));
            Ok(greeting)
        })
        .add_driver_factory(|services| {
            let exit_code: Arc<dyn Driver> =
                Arc::new(ExitCodeDriver::new(services.get_required::<Configuration>()?));
            Ok(exit_code)
        });

    let driver = builder.build()?;
    info!("Starting driveline v{}", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling drivers");
            on_interrupt.cancel();
        }
    });

    let result = driver.run(cancel).await;

    // Dropping the last handle to the services closes the event channel.
    drop(driver);
    drop(builder);
    match handler.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("event output failed: {}", e),
        Err(e) => warn!("event handler stopped: {}", e),
    }

    result.map_err(CliError::from)
}

/// Apply flags that take precedence over every configuration source
fn apply_cli_overrides(builder: &mut ConsoleDriverBuilder, cli: &Cli) -> Result<(), CliError> {
    if let Some(environment) = &cli.environment {
        if environment.trim().is_empty() {
            return Err(CliError::InvalidArguments(
                "--environment must not be blank".to_string(),
            ));
        }
        builder.use_environment(environment.trim())?;
    }
    if let Some(content_root) = &cli.content_root {
        builder.use_content_root(content_root)?;
    }
    if cli.debug {
        builder.configure_logging(|options| options.filter = "debug".to_string());
    }
    if cli.json {
        builder.configure_logging(|options| options.format = LogFormat::Json);
    }
    Ok(())
}
