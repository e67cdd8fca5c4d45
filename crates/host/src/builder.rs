//! Single-use builder that assembles a [`ConsoleDriver`]

use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use driveline_config::{Configuration, ConfigurationBuilder};
use driveline_container::{
    DefaultServiceProviderFactory, Options, ServiceCollection, ServiceProvider,
    ServiceProviderFactory, ServiceProviderOptions,
};
use driveline_errors::{BuildError, Error, Result};
use driveline_events::{AppEvent, EventEmitter, EventSender, GeneralEvent};
use driveline_types::{keys, CommandLineArguments};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapter::{ConfigureContainer, ConfigureContainerAdapter, ServiceFactory, ServiceFactoryAdapter};
use crate::context::{BuilderContext, Properties};
use crate::driver::{ConsoleDriver, Driver};
use crate::environment::HostEnvironment;
use crate::logging::{init_tracing, LoggingOptions};

type HostConfigurationAction = Box<dyn FnOnce(&mut ConfigurationBuilder) -> Result<()>>;
type AppConfigurationAction = Box<dyn FnOnce(&BuilderContext, &mut ConfigurationBuilder) -> Result<()>>;
type ServicesAction = Box<dyn FnOnce(&BuilderContext, &mut ServiceCollection) -> Result<()>>;

/// Collects configuration, service, and container callbacks, then turns
/// them into a runnable [`ConsoleDriver`] with [`ConsoleDriverBuilder::build`].
///
/// Callbacks run during `build`, in registration order within each kind.
/// Registration is single-threaded; the builder is neither `Send` nor
/// `Sync` so callbacks may capture non-thread-safe state.
pub struct ConsoleDriverBuilder {
    args: CommandLineArguments,
    properties: Properties,
    base_directory: PathBuf,
    host_configuration: Vec<HostConfigurationAction>,
    app_configuration: Vec<AppConfigurationAction>,
    services: Vec<ServicesAction>,
    container: Vec<Box<dyn ConfigureContainer>>,
    factory: Box<dyn ServiceFactory>,
    built: bool,
}

impl ConsoleDriverBuilder {
    /// Empty builder over the given command-line arguments
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: CommandLineArguments::new(args),
            properties: Properties::new(),
            base_directory: process_base_directory(),
            host_configuration: Vec::new(),
            app_configuration: Vec::new(),
            services: Vec::new(),
            container: Vec::new(),
            factory: Box::new(ServiceFactoryAdapter::concrete(
                DefaultServiceProviderFactory::default(),
            )),
            built: false,
        }
    }

    #[must_use]
    pub fn args(&self) -> &CommandLineArguments {
        &self.args
    }

    /// Values shared with every callback through [`BuilderContext::properties`]
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Directory relative content roots resolve against.
    ///
    /// Defaults to the directory of the running executable.
    #[must_use]
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn set_base_directory(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.base_directory = path.into();
        self
    }

    /// Add to the bootstrap configuration that decides the environment
    pub fn configure_host_configuration<F>(&mut self, action: F) -> &mut Self
    where
        F: FnOnce(&mut ConfigurationBuilder) -> Result<()> + 'static,
    {
        self.host_configuration.push(Box::new(action));
        self
    }

    /// Add to the app configuration, layered over the bootstrap configuration
    pub fn configure_app_configuration<F>(&mut self, action: F) -> &mut Self
    where
        F: FnOnce(&BuilderContext, &mut ConfigurationBuilder) -> Result<()> + 'static,
    {
        self.app_configuration.push(Box::new(action));
        self
    }

    /// Register services
    pub fn configure_services<F>(&mut self, action: F) -> &mut Self
    where
        F: FnOnce(&BuilderContext, &mut ServiceCollection) -> Result<()> + 'static,
    {
        self.services.push(Box::new(action));
        self
    }

    /// Replace the container with one produced by `factory`
    pub fn use_service_provider_factory<F: ServiceProviderFactory>(&mut self, factory: F) -> &mut Self {
        self.factory = Box::new(ServiceFactoryAdapter::concrete(factory));
        self
    }

    /// Pick the container factory once the environment and configuration
    /// are known. `resolver` runs at most once, during `build`; returning
    /// `None` fails the build.
    pub fn use_service_provider_factory_with<F, R>(&mut self, resolver: R) -> &mut Self
    where
        F: ServiceProviderFactory,
        R: FnOnce(&BuilderContext) -> Option<F> + 'static,
    {
        self.factory = Box::new(ServiceFactoryAdapter::deferred(resolver));
        self
    }

    /// Adjust the container builder of type `B` before the provider is made.
    ///
    /// `B` must be the builder type of the active factory when `build` runs;
    /// any other type fails the build with `BuildError::ContainerTypeMismatch`.
    pub fn configure_container<B, F>(&mut self, action: F) -> &mut Self
    where
        B: 'static,
        F: FnOnce(&BuilderContext, &mut B) -> Result<()> + 'static,
    {
        self.container
            .push(Box::new(ConfigureContainerAdapter::<B, F>::new(action)));
        self
    }

    /// Set the environment name in the bootstrap configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an empty name.
    pub fn use_environment(&mut self, environment: &str) -> Result<&mut Self> {
        if environment.is_empty() {
            return Err(Error::invalid_argument("environment", "must not be empty"));
        }
        let environment = environment.to_string();
        Ok(self.configure_host_configuration(move |config| {
            config.add_in_memory([(keys::ENVIRONMENT, environment)]);
            Ok(())
        }))
    }

    /// Set the content root in the bootstrap configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an empty path.
    pub fn use_content_root(&mut self, content_root: impl AsRef<Path>) -> Result<&mut Self> {
        let content_root = content_root.as_ref();
        if content_root.as_os_str().is_empty() {
            return Err(Error::invalid_argument("content_root", "must not be empty"));
        }
        let content_root = content_root.to_string_lossy().into_owned();
        Ok(self.configure_host_configuration(move |config| {
            config.add_in_memory([(keys::CONTENT_ROOT, content_root)]);
            Ok(())
        }))
    }

    /// Use the built-in container, with options decided at build time
    pub fn use_default_service_provider<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&BuilderContext, &mut ServiceProviderOptions) + 'static,
    {
        self.use_service_provider_factory_with(move |context| {
            let mut options = ServiceProviderOptions::default();
            configure(context, &mut options);
            Some(DefaultServiceProviderFactory::new(options))
        })
    }

    /// Adjust the logging options
    pub fn configure_logging<F>(&mut self, configure: F) -> &mut Self
    where
        F: Fn(&mut LoggingOptions) + Send + Sync + 'static,
    {
        self.configure_services(move |_, services| {
            services.configure::<LoggingOptions, _>(configure);
            Ok(())
        })
    }

    /// Publish lifecycle events on `sender`
    pub fn use_event_sender(&mut self, sender: EventSender) -> &mut Self {
        self.configure_services(move |_, services| {
            services.add_singleton(Arc::new(sender));
            Ok(())
        })
    }

    /// Register a driver instance
    pub fn add_driver(&mut self, driver: Arc<dyn Driver>) -> &mut Self {
        self.configure_services(move |_, services| {
            services.add_singleton::<dyn Driver>(driver);
            Ok(())
        })
    }

    /// Register a driver created from the container for every run
    pub fn add_driver_factory<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(&ServiceProvider) -> Result<Arc<dyn Driver>> + Send + Sync + 'static,
    {
        self.configure_services(move |_, services| {
            services.add_transient::<dyn Driver, _>(factory);
            Ok(())
        })
    }

    /// Run every callback and assemble the entry point.
    ///
    /// May be called once; a second call fails with
    /// `BuildError::AlreadyBuilt` without running anything.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a callback, a configuration source,
    /// the container factory, or the container itself.
    pub fn build(&mut self) -> Result<Arc<ConsoleDriver>> {
        if self.built {
            return Err(BuildError::AlreadyBuilt.into());
        }
        self.built = true;

        let host_configuration = self.build_host_configuration()?;
        let host_keys = host_configuration.len();
        let environment = Arc::new(HostEnvironment::from_configuration(
            &host_configuration,
            &self.base_directory,
        ));
        info!(
            environment = environment.environment_name(),
            application = environment.application_name().unwrap_or_default(),
            content_root = %environment.content_root_path().display(),
            "environment resolved"
        );

        let mut context = BuilderContext::new(
            Arc::clone(&environment),
            host_configuration.clone(),
            self.properties.clone(),
        );
        let app_configuration = self.build_app_configuration(&context, host_configuration)?;
        let app_keys = app_configuration.len();
        context.set_configuration(app_configuration.clone());
        let context = Arc::new(context);

        let provider = self.create_service_provider(&context, environment, app_configuration)?;

        if let Some(logging) = provider.get::<Options<LoggingOptions>>()? {
            if init_tracing(&logging) {
                debug!(filter = %logging.filter, "tracing subscriber installed");
            }
        }
        if let Some(events) = provider.get::<EventSender>()? {
            events.emit(AppEvent::General(GeneralEvent::configuration_loaded("host", host_keys)));
            events.emit(AppEvent::General(GeneralEvent::configuration_loaded("app", app_keys)));
            let environment = context.environment();
            events.emit_debug(format!(
                "environment {:?} with content root {}",
                environment.environment_name(),
                environment.content_root_path().display()
            ));
        }

        provider.get_required::<ConsoleDriver>()
    }

    /// Build, then [`ConsoleDriver::start`]
    ///
    /// # Errors
    ///
    /// Returns build errors and driver errors.
    pub async fn start(&mut self, cancel: CancellationToken) -> Result<i32> {
        let driver = self.build()?;
        driver.start(cancel).await
    }

    /// Build, then [`ConsoleDriver::run`]
    ///
    /// # Errors
    ///
    /// Returns build errors and driver errors.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<i32> {
        let driver = self.build()?;
        driver.run(cancel).await
    }

    fn build_host_configuration(&mut self) -> Result<Configuration> {
        let mut builder = ConfigurationBuilder::new();
        for action in mem::take(&mut self.host_configuration) {
            action(&mut builder)?;
        }
        let configuration = builder.build()?;
        debug!(keys = configuration.len(), "host configuration built");
        Ok(configuration)
    }

    fn build_app_configuration(
        &mut self,
        context: &BuilderContext,
        host_configuration: Configuration,
    ) -> Result<Configuration> {
        let mut builder = ConfigurationBuilder::new();
        builder
            .set_base_path(context.environment().content_root_path())
            .add_configuration(host_configuration);
        for action in mem::take(&mut self.app_configuration) {
            action(context, &mut builder)?;
        }
        let configuration = builder.build()?;
        debug!(keys = configuration.len(), "app configuration built");
        Ok(configuration)
    }

    fn create_service_provider(
        &mut self,
        context: &Arc<BuilderContext>,
        environment: Arc<HostEnvironment>,
        configuration: Configuration,
    ) -> Result<ServiceProvider> {
        let mut services = ServiceCollection::new();
        services
            .add_singleton(Arc::new(self.args.clone()))
            .add_singleton(environment)
            .add_singleton(Arc::clone(context))
            .add_singleton(Arc::new(configuration))
            .add_options::<LoggingOptions>();
        let args = self.args.clone();
        services.add_transient(move |provider: &ServiceProvider| {
            Ok(Arc::new(ConsoleDriver::new(provider.clone(), args.clone())))
        });

        for action in mem::take(&mut self.services) {
            action(context, &mut services)?;
        }
        debug!(
            services = services.len(),
            container = self.factory.builder_type(),
            "services registered"
        );

        let mut builder = self.factory.create_builder(context, services)?;
        for action in mem::take(&mut self.container) {
            action.apply(context, &mut builder)?;
        }
        self.factory
            .create_service_provider(builder)?
            .ok_or_else(|| BuildError::NullServiceProvider.into())
    }
}

impl fmt::Debug for ConsoleDriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleDriverBuilder")
            .field("args", &self.args)
            .field("base_directory", &self.base_directory)
            .field("host_configuration", &self.host_configuration.len())
            .field("app_configuration", &self.app_configuration.len())
            .field("services", &self.services.len())
            .field("container", &self.container.len())
            .field("container_builder", &self.factory.builder_type())
            .field("built", &self.built)
            .finish()
    }
}

/// Directory of the running executable, falling back to the working directory
fn process_base_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
