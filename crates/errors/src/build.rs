//! Build orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Protocol violations raised while turning a builder into a runnable driver.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("build may only run once")]
    AlreadyBuilt,

    #[error("factory resolution returned no factory")]
    FactoryResolverReturnedNone,

    #[error("create_builder must be called before create_service_provider")]
    CreateBuilderNotCalled,

    #[error("the service provider factory returned no service provider")]
    NullServiceProvider,

    #[error("container builder type mismatch: configure action expects {expected}, factory builds {actual}")]
    ContainerTypeMismatch { expected: String, actual: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyBuilt => Some("Create a new builder for every driver you need."),
            Self::FactoryResolverReturnedNone => {
                Some("Make the deferred factory resolver return a factory for every environment.")
            }
            Self::ContainerTypeMismatch { .. } => Some(
                "Register configure_container callbacks for the builder type of the active service provider factory.",
            ),
            Self::CreateBuilderNotCalled | Self::NullServiceProvider => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::AlreadyBuilt => "build.already_built",
            Self::FactoryResolverReturnedNone => "build.factory_resolver_returned_none",
            Self::CreateBuilderNotCalled => "build.create_builder_not_called",
            Self::NullServiceProvider => "build.null_service_provider",
            Self::ContainerTypeMismatch { .. } => "build.container_type_mismatch",
        };
        Some(code)
    }
}
