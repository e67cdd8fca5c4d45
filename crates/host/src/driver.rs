//! Drivers and the loop that runs them

use std::sync::Arc;

use async_trait::async_trait;
use driveline_container::ServiceProvider;
use driveline_errors::{Error, Result};
use driveline_events::{CorrelatedEmitter, EventEmitter, EventSender};
use driveline_types::CommandLineArguments;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A unit of work run once per process.
///
/// A non-zero exit code is an ordinary result, not an error. Honoring the
/// cancellation token is up to each driver.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Name used in logs and events
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn execute(&self, args: &CommandLineArguments, cancel: CancellationToken) -> Result<i32>;
}

/// Fold one exit code into the running aggregate: the last non-zero code wins
#[must_use]
pub fn fold_exit_code(aggregate: i32, code: i32) -> i32 {
    if code == 0 {
        aggregate
    } else {
        code
    }
}

/// Aggregate exit codes in order; 0 when every code is 0
pub fn aggregate_exit_codes(codes: impl IntoIterator<Item = i32>) -> i32 {
    codes.into_iter().fold(0, fold_exit_code)
}

/// Releases the provider when dropped, so every exit path of `run` disposes
struct DisposeOnDrop<'a> {
    services: &'a ServiceProvider,
    events: Option<EventSender>,
}

impl<'a> DisposeOnDrop<'a> {
    fn new(services: &'a ServiceProvider) -> Self {
        // Captured up front: the sender is unreachable once disposal starts.
        let events = services.get::<EventSender>().ok().flatten().map(|s| (*s).clone());
        Self { services, events }
    }
}

impl Drop for DisposeOnDrop<'_> {
    fn drop(&mut self) {
        if self.services.is_disposed() {
            return;
        }
        self.services.dispose();
        if let Some(events) = self.events.take() {
            events.emit_host_disposed();
        }
    }
}

/// Entry point produced by a successful build
pub struct ConsoleDriver {
    services: ServiceProvider,
    args: CommandLineArguments,
}

impl ConsoleDriver {
    pub(crate) fn new(services: ServiceProvider, args: CommandLineArguments) -> Self {
        Self { services, args }
    }

    /// The assembled service provider
    #[must_use]
    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    #[must_use]
    pub fn args(&self) -> &CommandLineArguments {
        &self.args
    }

    /// Run every registered driver in registration order and return the
    /// aggregated exit code.
    ///
    /// Drivers run strictly one after another. A driver error stops the
    /// loop and is returned as is; later drivers are not run.
    ///
    /// # Errors
    ///
    /// Returns the first driver error, or a container error if the drivers
    /// cannot be resolved.
    pub async fn start(&self, cancel: CancellationToken) -> Result<i32> {
        let sender = self.services.get::<EventSender>()?;
        let emitter = CorrelatedEmitter::new(sender.map(|s| (*s).clone()));

        let drivers = self.services.get_all::<dyn Driver>()?;
        debug!(event_id = 1, drivers = drivers.len(), "Hosting starting");
        emitter.emit_host_starting(drivers.len());

        let mut exit_code = 0;
        for (index, driver) in drivers.iter().enumerate() {
            let name = driver.name();
            emitter.emit_driver_started(name, index);
            debug!(driver = name, index, "driver starting");

            match driver.execute(&self.args, cancel.clone()).await {
                Ok(code) => {
                    debug!(driver = name, exit_code = code, "driver completed");
                    emitter.emit_driver_completed(name, code);
                    exit_code = fold_exit_code(exit_code, code);
                }
                Err(err) => {
                    warn!(driver = name, error = %err, "driver failed");
                    emitter.emit_driver_failed(name, &err);
                    return Err(err);
                }
            }
        }

        emitter.emit_host_stopped(exit_code);
        debug!(event_id = 4, exit_code, "Hosting stopped");
        Ok(exit_code)
    }

    /// [`ConsoleDriver::start`], then dispose the service provider.
    ///
    /// Disposal happens on every exit path: success, driver error, panic, or
    /// the returned future being dropped.
    ///
    /// # Errors
    ///
    /// Same as [`ConsoleDriver::start`].
    pub async fn run(&self, cancel: CancellationToken) -> Result<i32> {
        let _dispose = DisposeOnDrop::new(&self.services);
        self.start(cancel).await
    }

    /// [`ConsoleDriver::start`] on a private current-thread runtime.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Fails if the runtime cannot be created, otherwise as `start`.
    pub fn start_blocking(&self, cancel: CancellationToken) -> Result<i32> {
        runtime()?.block_on(self.start(cancel))
    }

    /// [`ConsoleDriver::run`] on a private current-thread runtime.
    ///
    /// The provider is disposed even if the runtime cannot be created.
    ///
    /// # Errors
    ///
    /// Fails if the runtime cannot be created, otherwise as `run`.
    pub fn run_blocking(&self, cancel: CancellationToken) -> Result<i32> {
        let _dispose = DisposeOnDrop::new(&self.services);
        runtime()?.block_on(self.start(cancel))
    }
}

impl std::fmt::Debug for ConsoleDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleDriver")
            .field("services", &self.services)
            .field("args", &self.args)
            .finish()
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
}

/// Driver built from an async closure
pub struct FnDriver<F> {
    name: String,
    run: F,
}

impl<F> FnDriver<F> {
    pub fn new(name: impl Into<String>, run: F) -> Self {
        Self {
            name: name.into(),
            run,
        }
    }
}

#[async_trait]
impl<F, Fut> Driver for FnDriver<F>
where
    F: Fn(CommandLineArguments, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<i32>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, args: &CommandLineArguments, cancel: CancellationToken) -> Result<i32> {
        (self.run)(args.clone(), cancel).await
    }
}

/// Shorthand for an `Arc<dyn Driver>` from an async closure
pub fn driver_fn<F, Fut>(name: impl Into<String>, run: F) -> Arc<dyn Driver>
where
    F: Fn(CommandLineArguments, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<i32>> + Send + 'static,
{
    Arc::new(FnDriver::new(name, run))
}
