//! Service resolution

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use driveline_errors::{ContainerError, Result, UserFacingError};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::collection::{Erased, Implementation, ServiceDescriptor, ServiceLifetime};
use crate::options::Options;

/// Settings applied when a provider is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceProviderOptions {
    /// Create every lazy singleton up front so broken factories fail the build
    pub validate_on_build: bool,
}

#[derive(Default)]
struct State {
    singletons: HashMap<usize, Erased>,
    created: Vec<usize>,
    disposed: bool,
}

struct Inner {
    descriptors: Vec<ServiceDescriptor>,
    by_type: HashMap<TypeId, Vec<usize>>,
    state: Mutex<State>,
}

/// Resolves registered services.
///
/// Cloning yields another handle to the same provider; singletons are shared
/// by all handles. After [`ServiceProvider::dispose`] every resolution fails
/// with `ContainerError::Disposed`.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<Inner>,
}

impl ServiceProvider {
    pub(crate) fn new(
        descriptors: Vec<ServiceDescriptor>,
        options: ServiceProviderOptions,
    ) -> Result<Self> {
        let mut by_type: HashMap<TypeId, Vec<usize>> = HashMap::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            by_type
                .entry(descriptor.service_type)
                .or_default()
                .push(index);
        }
        let provider = Self {
            inner: Arc::new(Inner {
                descriptors,
                by_type,
                state: Mutex::new(State::default()),
            }),
        };
        debug!(
            services = provider.inner.descriptors.len(),
            validate_on_build = options.validate_on_build,
            "service provider created"
        );
        if options.validate_on_build {
            provider.validate()?;
        }
        Ok(provider)
    }

    /// Resolve the last registration of `T`, if any
    ///
    /// # Errors
    ///
    /// Fails when the provider is disposed or a factory fails.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        self.ensure_live()?;
        match self.indexes::<T>().last() {
            Some(&index) => self.resolve::<T>(index).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve the last registration of `T`
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::ServiceNotRegistered` when `T` is unknown.
    pub fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get::<T>()?.ok_or_else(|| {
            ContainerError::ServiceNotRegistered {
                service: type_name::<T>().to_string(),
            }
            .into()
        })
    }

    /// Resolve every registration of `T` in registration order
    ///
    /// # Errors
    ///
    /// Fails when the provider is disposed or a factory fails.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>> {
        self.ensure_live()?;
        self.indexes::<T>()
            .iter()
            .map(|&index| self.resolve::<T>(index))
            .collect()
    }

    /// Resolve `Options<T>`
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::ServiceNotRegistered` unless `add_options::<T>()`
    /// or `configure::<T>()` was called during registration.
    pub fn options<T: Send + Sync + 'static>(&self) -> Result<Arc<Options<T>>> {
        self.get_required::<Options<T>>()
    }

    /// Whether `T` has at least one registration
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        !self.indexes::<T>().is_empty()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }

    /// Release cached singletons in reverse creation order.
    ///
    /// Idempotent. Pre-built instances passed to `add_singleton` are owned by
    /// the caller and are not part of the release order.
    pub fn dispose(&self) {
        let (mut singletons, created) = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                std::mem::take(&mut state.singletons),
                std::mem::take(&mut state.created),
            )
        };

        // Dropped outside the lock so destructors may touch the provider.
        for index in created.into_iter().rev() {
            if let Some(service) = singletons.remove(&index) {
                trace!(
                    service = self.inner.descriptors[index].service_name,
                    "releasing singleton"
                );
                drop(service);
            }
        }
        debug!("service provider disposed");
    }

    fn validate(&self) -> Result<()> {
        for (index, descriptor) in self.inner.descriptors.iter().enumerate() {
            let lazy_singleton = descriptor.lifetime == ServiceLifetime::Singleton
                && matches!(descriptor.implementation, Implementation::Factory(_));
            if !lazy_singleton {
                continue;
            }
            if let Err(err) = self.resolve_erased(index) {
                return Err(ContainerError::ResolutionFailed {
                    service: descriptor.service_name.to_string(),
                    message: err.user_message().into_owned(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.inner.state.lock().disposed {
            return Err(ContainerError::Disposed.into());
        }
        Ok(())
    }

    fn indexes<T: ?Sized + 'static>(&self) -> &[usize] {
        self.inner
            .by_type
            .get(&TypeId::of::<T>())
            .map_or(&[][..], Vec::as_slice)
    }

    fn resolve<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        let erased = self.resolve_erased(index)?;
        (*erased)
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| {
                ContainerError::TypeMismatch {
                    service: type_name::<T>().to_string(),
                }
                .into()
            })
    }

    fn resolve_erased(&self, index: usize) -> Result<Erased> {
        let descriptor = &self.inner.descriptors[index];
        let factory = match &descriptor.implementation {
            Implementation::Instance(instance) => return Ok(Arc::clone(instance)),
            Implementation::Factory(factory) => factory,
        };

        if descriptor.lifetime == ServiceLifetime::Transient {
            return factory(self);
        }

        if let Some(existing) = self.inner.state.lock().singletons.get(&index) {
            return Ok(Arc::clone(existing));
        }

        // The factory runs unlocked so it can resolve its own dependencies.
        let created = factory(self)?;

        let mut state = self.inner.state.lock();
        if state.disposed {
            return Err(ContainerError::Disposed.into());
        }
        if let Some(existing) = state.singletons.get(&index) {
            return Ok(Arc::clone(existing));
        }
        trace!(service = descriptor.service_name, "singleton created");
        state.singletons.insert(index, Arc::clone(&created));
        state.created.push(index);
        Ok(created)
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner.descriptors.len())
            .field("singletons_created", &state.created.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ServiceCollection;
    use driveline_errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn build(services: ServiceCollection) -> ServiceProvider {
        services
            .build_service_provider(ServiceProviderOptions::default())
            .unwrap()
    }

    #[test]
    fn test_singleton_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut services = ServiceCollection::new();
        services.add_singleton_factory(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(String::from("shared")))
        });
        let provider = build(services);

        let a = provider.get_required::<String>().unwrap();
        let b = provider.clone().get_required::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_creates_new_instances() {
        let mut services = ServiceCollection::new();
        services.add_transient(|_| Ok(Arc::new(vec![1_u8])));
        let provider = build(services);
        let a = provider.get_required::<Vec<u8>>().unwrap();
        let b = provider.get_required::<Vec<u8>>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_get_returns_last_and_get_all_returns_every_registration() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Arc::new(1_i32));
        services.add_singleton(Arc::new(2_i32));
        let provider = build(services);
        assert_eq!(*provider.get_required::<i32>().unwrap(), 2);
        let all: Vec<i32> = provider
            .get_all::<i32>()
            .unwrap()
            .iter()
            .map(|v| **v)
            .collect();
        assert_eq!(all, vec![1, 2]);
    }

    #[test]
    fn test_missing_service() {
        let provider = build(ServiceCollection::new());
        assert!(provider.get::<u64>().unwrap().is_none());
        assert!(provider.get_all::<u64>().unwrap().is_empty());
        assert!(matches!(
            provider.get_required::<u64>(),
            Err(Error::Container(ContainerError::ServiceNotRegistered { .. }))
        ));
    }

    #[test]
    fn test_factories_can_resolve_dependencies() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Arc::new(21_u32));
        services.add_singleton_factory(|provider| {
            let base = provider.get_required::<u32>()?;
            Ok(Arc::new(u64::from(*base) * 2))
        });
        let provider = build(services);
        assert_eq!(*provider.get_required::<u64>().unwrap(), 42);
    }

    #[test]
    fn test_dispose_releases_singletons_in_reverse_creation_order() {
        struct Tracked(&'static str, Arc<Mutex<Vec<&'static str>>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.1.lock().push(self.0);
            }
        }
        struct First(#[allow(dead_code)] Tracked);
        struct Second(#[allow(dead_code)] Tracked);

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut services = ServiceCollection::new();
        let l1 = Arc::clone(&log);
        services.add_singleton_factory(move |_| Ok(Arc::new(First(Tracked("first", Arc::clone(&l1))))));
        let l2 = Arc::clone(&log);
        services.add_singleton_factory(move |_| Ok(Arc::new(Second(Tracked("second", Arc::clone(&l2))))));
        let provider = build(services);

        drop(provider.get_required::<First>().unwrap());
        drop(provider.get_required::<Second>().unwrap());
        provider.dispose();

        assert_eq!(*log.lock(), vec!["second", "first"]);
        assert!(provider.is_disposed());
        assert!(matches!(
            provider.get::<First>(),
            Err(Error::Container(ContainerError::Disposed))
        ));
        provider.dispose();
    }

    #[test]
    fn test_validate_on_build_surfaces_factory_failures() {
        let mut services = ServiceCollection::new();
        services.add_singleton_factory::<String, _>(|_| Err(Error::internal("boom")));
        let err = services
            .build_service_provider(ServiceProviderOptions {
                validate_on_build: true,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Container(ContainerError::ResolutionFailed { .. })
        ));
    }

    #[test]
    fn test_options_apply_configure_actions_in_order() {
        #[derive(Default)]
        struct Settings {
            trail: Vec<&'static str>,
        }

        let mut services = ServiceCollection::new();
        services.add_singleton(Arc::new("from-container"));
        services.configure::<Settings, _>(|s| s.trail.push("first"));
        services.configure_with::<Settings, _>(|provider, s| {
            s.trail.push(*provider.get_required::<&'static str>()?);
            Ok(())
        });
        let provider = build(services);
        let options = provider.options::<Settings>().unwrap();
        assert_eq!(options.trail, vec!["first", "from-container"]);
    }
}
