//! Type-erased bridge between the builder and a service provider factory

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use driveline_container::{ServiceCollection, ServiceProvider, ServiceProviderFactory};
use driveline_errors::{BuildError, Result};
use tracing::debug;

use crate::context::BuilderContext;

/// A container builder whose concrete type is known only at runtime.
///
/// Carries the builder's type tag so every access is checked.
pub struct ContainerBuilderHandle {
    type_id: TypeId,
    type_name: &'static str,
    inner: Box<dyn Any>,
}

impl ContainerBuilderHandle {
    fn new<B: 'static>(builder: B) -> Self {
        Self {
            type_id: TypeId::of::<B>(),
            type_name: type_name::<B>(),
            inner: Box::new(builder),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is<B: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<B>()
    }

    /// Borrow the builder as `B`
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ContainerTypeMismatch` when the handle holds
    /// another type.
    pub fn downcast_mut<B: 'static>(&mut self) -> Result<&mut B> {
        let actual = self.type_name;
        self.inner.downcast_mut::<B>().ok_or_else(|| {
            BuildError::ContainerTypeMismatch {
                expected: type_name::<B>().to_string(),
                actual: actual.to_string(),
            }
            .into()
        })
    }

    fn into_inner<B: 'static>(self) -> Result<B> {
        let actual = self.type_name;
        self.inner
            .downcast::<B>()
            .map(|builder| *builder)
            .map_err(|_| {
                BuildError::ContainerTypeMismatch {
                    expected: type_name::<B>().to_string(),
                    actual: actual.to_string(),
                }
                .into()
            })
    }
}

impl fmt::Debug for ContainerBuilderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilderHandle")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// What the builder needs from a factory, with the builder type erased
pub(crate) trait ServiceFactory {
    /// Type of builder the factory produces
    fn builder_type(&self) -> &'static str;

    fn create_builder(
        &mut self,
        context: &BuilderContext,
        services: ServiceCollection,
    ) -> Result<ContainerBuilderHandle>;

    fn create_service_provider(&mut self, builder: ContainerBuilderHandle) -> Result<Option<ServiceProvider>>;
}

type Resolver<F> = Box<dyn FnOnce(&BuilderContext) -> Option<F>>;

enum FactoryState<F> {
    Concrete(F),
    Deferred(Resolver<F>),
    /// The resolver ran and produced nothing
    Exhausted,
}

/// Holds a concrete factory or a resolver that produces one on first use
pub(crate) struct ServiceFactoryAdapter<F: ServiceProviderFactory> {
    state: FactoryState<F>,
}

impl<F: ServiceProviderFactory> ServiceFactoryAdapter<F> {
    pub(crate) fn concrete(factory: F) -> Self {
        Self {
            state: FactoryState::Concrete(factory),
        }
    }

    pub(crate) fn deferred(resolver: impl FnOnce(&BuilderContext) -> Option<F> + 'static) -> Self {
        Self {
            state: FactoryState::Deferred(Box::new(resolver)),
        }
    }

    fn resolve(&mut self, context: &BuilderContext) -> Result<&F> {
        self.state = match std::mem::replace(&mut self.state, FactoryState::Exhausted) {
            FactoryState::Deferred(resolver) => {
                debug!(factory = type_name::<F>(), "resolving deferred service provider factory");
                resolver(context).map_or(FactoryState::Exhausted, FactoryState::Concrete)
            }
            resolved => resolved,
        };
        match &self.state {
            FactoryState::Concrete(factory) => Ok(factory),
            _ => Err(BuildError::FactoryResolverReturnedNone.into()),
        }
    }
}

impl<F: ServiceProviderFactory> ServiceFactory for ServiceFactoryAdapter<F> {
    fn builder_type(&self) -> &'static str {
        type_name::<F::Builder>()
    }

    fn create_builder(
        &mut self,
        context: &BuilderContext,
        services: ServiceCollection,
    ) -> Result<ContainerBuilderHandle> {
        let factory = self.resolve(context)?;
        Ok(ContainerBuilderHandle::new(factory.create_builder(services)))
    }

    fn create_service_provider(&mut self, builder: ContainerBuilderHandle) -> Result<Option<ServiceProvider>> {
        let FactoryState::Concrete(factory) = &self.state else {
            return Err(BuildError::CreateBuilderNotCalled.into());
        };
        let builder = builder.into_inner::<F::Builder>()?;
        factory.create_service_provider(builder)
    }
}

/// A `configure_container` callback with the builder type erased
pub(crate) trait ConfigureContainer {
    fn apply(self: Box<Self>, context: &BuilderContext, builder: &mut ContainerBuilderHandle) -> Result<()>;
}

/// Callback for container builders of type `B`, checked against the handle
pub(crate) struct ConfigureContainerAdapter<B, A> {
    action: A,
    _builder: PhantomData<fn(&mut B)>,
}

impl<B, A> ConfigureContainerAdapter<B, A>
where
    B: 'static,
    A: FnOnce(&BuilderContext, &mut B) -> Result<()>,
{
    pub(crate) fn new(action: A) -> Self {
        Self {
            action,
            _builder: PhantomData,
        }
    }
}

impl<B, A> ConfigureContainer for ConfigureContainerAdapter<B, A>
where
    B: 'static,
    A: FnOnce(&BuilderContext, &mut B) -> Result<()>,
{
    fn apply(self: Box<Self>, context: &BuilderContext, builder: &mut ContainerBuilderHandle) -> Result<()> {
        let builder = builder.downcast_mut::<B>()?;
        (self.action)(context, builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Properties;
    use crate::environment::HostEnvironment;
    use driveline_config::Configuration;
    use driveline_container::DefaultServiceProviderFactory;
    use driveline_errors::Error;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn context() -> BuilderContext {
        BuilderContext::new(
            Arc::new(HostEnvironment::new("Development", None, "/srv/app")),
            Configuration::empty(),
            Properties::new(),
        )
    }

    #[test]
    fn test_deferred_resolver_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut adapter = ServiceFactoryAdapter::deferred(move |ctx: &BuilderContext| {
            counter.set(counter.get() + 1);
            assert!(ctx.environment().is_development());
            Some(DefaultServiceProviderFactory::default())
        });

        let ctx = context();
        let handle = adapter.create_builder(&ctx, ServiceCollection::new()).unwrap();
        assert!(handle.is::<ServiceCollection>());
        let again = adapter.create_builder(&ctx, ServiceCollection::new()).unwrap();
        assert!(adapter.create_service_provider(again).unwrap().is_some());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_deferred_resolver_returning_none_is_fatal() {
        let mut adapter =
            ServiceFactoryAdapter::<DefaultServiceProviderFactory>::deferred(|_| None);
        let err = adapter
            .create_builder(&context(), ServiceCollection::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::FactoryResolverReturnedNone)
        ));
    }

    #[test]
    fn test_create_service_provider_requires_create_builder() {
        let mut adapter = ServiceFactoryAdapter::<DefaultServiceProviderFactory>::deferred(|_| {
            Some(DefaultServiceProviderFactory::default())
        });
        let handle = ContainerBuilderHandle::new(ServiceCollection::new());
        let err = adapter.create_service_provider(handle).unwrap_err();
        assert!(matches!(err, Error::Build(BuildError::CreateBuilderNotCalled)));
    }

    #[test]
    fn test_configure_action_checks_builder_type() {
        let mut handle = ContainerBuilderHandle::new(ServiceCollection::new());
        let ok: Box<dyn ConfigureContainer> = Box::new(ConfigureContainerAdapter::new(
            |_: &BuilderContext, services: &mut ServiceCollection| {
                services.add_singleton(Arc::new(1_u8));
                Ok(())
            },
        ));
        ok.apply(&context(), &mut handle).unwrap();
        assert_eq!(handle.downcast_mut::<ServiceCollection>().unwrap().len(), 1);

        let wrong: Box<dyn ConfigureContainer> = Box::new(ConfigureContainerAdapter::new(
            |_: &BuilderContext, _: &mut Vec<String>| Ok(()),
        ));
        let err = wrong.apply(&context(), &mut handle).unwrap_err();
        match err {
            Error::Build(BuildError::ContainerTypeMismatch { expected, actual }) => {
                assert!(expected.contains("Vec"));
                assert!(actual.contains("ServiceCollection"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
