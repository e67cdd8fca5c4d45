//! Pluggable container construction

use driveline_errors::Result;

use crate::collection::ServiceCollection;
use crate::provider::{ServiceProvider, ServiceProviderOptions};

/// Turns registrations into a provider through a container-specific builder.
///
/// `Builder` is the object `configure_container` callbacks receive. It must
/// be `'static` so it can travel behind a type-erased handle.
pub trait ServiceProviderFactory: 'static {
    type Builder: 'static;

    /// Wrap the collected registrations in this factory's builder
    fn create_builder(&self, services: ServiceCollection) -> Self::Builder;

    /// Produce the provider. `Ok(None)` means the factory produced nothing,
    /// which callers treat as a fatal build error.
    ///
    /// # Errors
    ///
    /// Returns any error raised while assembling the provider.
    fn create_service_provider(&self, builder: Self::Builder) -> Result<Option<ServiceProvider>>;
}

/// Factory for the built-in container; its builder is the collection itself
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultServiceProviderFactory {
    options: ServiceProviderOptions,
}

impl DefaultServiceProviderFactory {
    #[must_use]
    pub fn new(options: ServiceProviderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> ServiceProviderOptions {
        self.options
    }
}

impl ServiceProviderFactory for DefaultServiceProviderFactory {
    type Builder = ServiceCollection;

    fn create_builder(&self, services: ServiceCollection) -> ServiceCollection {
        services
    }

    fn create_service_provider(&self, builder: ServiceCollection) -> Result<Option<ServiceProvider>> {
        builder.build_service_provider(self.options).map(Some)
    }
}
