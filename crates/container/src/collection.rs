//! Service registrations

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use driveline_errors::Result;

use crate::options::{ConfigureOptions, Options};
use crate::provider::{ServiceProvider, ServiceProviderOptions};

/// A resolved service stored without its static type. Always holds an `Arc<T>`.
pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

pub(crate) type ErasedFactory = Arc<dyn Fn(&ServiceProvider) -> Result<Erased> + Send + Sync>;

pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Erased {
    Arc::new(value)
}

/// How long a resolved service lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// Created once per provider and cached until disposal
    Singleton,
    /// Created on every resolution
    Transient,
}

pub(crate) enum Implementation {
    Instance(Erased),
    Factory(ErasedFactory),
}

/// One registration of a service type
pub struct ServiceDescriptor {
    pub(crate) service_type: TypeId,
    pub(crate) service_name: &'static str,
    pub(crate) lifetime: ServiceLifetime,
    pub(crate) implementation: Implementation,
}

impl ServiceDescriptor {
    #[must_use]
    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    #[must_use]
    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    /// Whether this registration holds a pre-built instance
    #[must_use]
    pub fn is_instance(&self) -> bool {
        matches!(self.implementation, Implementation::Instance(_))
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service_name)
            .field("lifetime", &self.lifetime)
            .field("instance", &self.is_instance())
            .finish()
    }
}

/// Ordered list of service registrations.
///
/// Services are keyed by type; `T` may be unsized so trait objects such as
/// `dyn Driver` can be registered several times and resolved as a list.
#[derive(Default, Debug)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built singleton
    pub fn add_singleton<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.push::<T>(
            ServiceLifetime::Singleton,
            Implementation::Instance(erase(instance)),
        )
    }

    /// Register a singleton created on first resolution
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.push::<T>(ServiceLifetime::Singleton, Self::factory(factory))
    }

    /// Register a service created on every resolution
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.push::<T>(ServiceLifetime::Transient, Self::factory(factory))
    }

    /// Register a singleton unless the type is already registered
    pub fn try_add_singleton<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            self.add_singleton(instance);
        }
        self
    }

    /// Register a lazy singleton unless the type is already registered
    pub fn try_add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            self.add_singleton_factory(factory);
        }
        self
    }

    /// Make `Options<T>` resolvable.
    ///
    /// The options value starts from `T::default()` and every registered
    /// configure action is applied in registration order on first use.
    pub fn add_options<T>(&mut self) -> &mut Self
    where
        T: Default + Send + Sync + 'static,
    {
        self.try_add_singleton_factory::<Options<T>, _>(|provider| {
            let mut value = T::default();
            for action in provider.get_all::<ConfigureOptions<T>>()? {
                action.apply(provider, &mut value)?;
            }
            Ok(Arc::new(Options::new(value)))
        })
    }

    /// Add a configure action for `T`
    pub fn configure<T, F>(&mut self, action: F) -> &mut Self
    where
        T: Default + Send + Sync + 'static,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.configure_with::<T, _>(move |_, value| {
            action(value);
            Ok(())
        })
    }

    /// Add a configure action for `T` that may resolve other services
    pub fn configure_with<T, F>(&mut self, action: F) -> &mut Self
    where
        T: Default + Send + Sync + 'static,
        F: Fn(&ServiceProvider, &mut T) -> Result<()> + Send + Sync + 'static,
    {
        self.add_options::<T>();
        self.add_singleton(Arc::new(ConfigureOptions::new(action)))
    }

    /// Whether at least one registration exists for `T`
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.descriptors.iter().any(|d| d.service_type == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registrations in order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Freeze the registrations into a provider
    ///
    /// # Errors
    ///
    /// With `validate_on_build`, returns the first failure raised while
    /// eagerly creating singletons.
    pub fn build_service_provider(self, options: ServiceProviderOptions) -> Result<ServiceProvider> {
        ServiceProvider::new(self.descriptors, options)
    }

    fn factory<T, F>(factory: F) -> Implementation
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Implementation::Factory(Arc::new(move |provider: &ServiceProvider| {
            factory(provider).map(erase)
        }))
    }

    fn push<T: ?Sized + 'static>(
        &mut self,
        lifetime: ServiceLifetime,
        implementation: Implementation,
    ) -> &mut Self {
        self.descriptors.push(ServiceDescriptor {
            service_type: TypeId::of::<T>(),
            service_name: type_name::<T>(),
            lifetime,
            implementation,
        });
        self
    }
}
