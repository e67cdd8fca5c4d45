//! Integration tests for the dependency container

#[cfg(test)]
mod tests {
    use driveline_container::*;
    use driveline_errors::{ContainerError, Error};
    use proptest::prelude::*;
    use std::sync::Arc;

    trait Step: Send + Sync {
        fn id(&self) -> usize;
    }

    struct Numbered(usize);

    impl Step for Numbered {
        fn id(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_default_factory_round_trip() {
        let factory = DefaultServiceProviderFactory::default();
        let mut services = ServiceCollection::new();
        services.add_singleton(Arc::new(String::from("value")));

        let mut builder = factory.create_builder(services);
        builder.add_singleton(Arc::new(7_u8));
        let provider = factory.create_service_provider(builder).unwrap().unwrap();

        assert_eq!(provider.get_required::<String>().unwrap().as_str(), "value");
        assert_eq!(*provider.get_required::<u8>().unwrap(), 7);
    }

    #[test]
    fn test_validating_factory_creates_singletons_eagerly() {
        let factory = DefaultServiceProviderFactory::new(ServiceProviderOptions {
            validate_on_build: true,
        });
        let mut services = ServiceCollection::new();
        services.add_singleton_factory::<u8, _>(|provider| {
            let _ = provider.get_required::<u16>()?;
            Ok(Arc::new(1))
        });
        let err = factory
            .create_service_provider(factory.create_builder(services))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Container(ContainerError::ResolutionFailed { .. })
        ));
    }

    #[test]
    fn test_provider_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServiceProvider>();
    }

    #[tokio::test]
    async fn test_resolution_from_another_task() {
        let mut services = ServiceCollection::new();
        services.add_singleton_factory(|_| Ok(Arc::new(String::from("shared"))));
        let provider = services
            .build_service_provider(ServiceProviderOptions::default())
            .unwrap();

        let handle = provider.clone();
        let remote = tokio::spawn(async move { handle.get_required::<String>().unwrap() })
            .await
            .unwrap();
        let local = provider.get_required::<String>().unwrap();
        assert!(Arc::ptr_eq(&remote, &local));
    }

    proptest! {
        #[test]
        fn prop_get_all_preserves_registration_order(count in 0usize..24) {
            let mut services = ServiceCollection::new();
            for i in 0..count {
                services.add_transient::<dyn Step, _>(move |_| Ok(Arc::new(Numbered(i)) as Arc<dyn Step>));
            }
            let provider = services
                .build_service_provider(ServiceProviderOptions::default())
                .unwrap();
            let ids: Vec<usize> = provider
                .get_all::<dyn Step>()
                .unwrap()
                .iter()
                .map(|s| s.id())
                .collect();
            prop_assert_eq!(ids, (0..count).collect::<Vec<_>>());
            let last = provider.get::<dyn Step>().unwrap().map(|s| s.id());
            prop_assert_eq!(last, count.checked_sub(1));
        }
    }
}
