//! Dependency container error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ContainerError {
    #[error("no service registered for {service}")]
    ServiceNotRegistered { service: String },

    #[error("service provider has been disposed")]
    Disposed,

    #[error("failed to resolve {service}: {message}")]
    ResolutionFailed { service: String, message: String },

    #[error("registered value for {service} has an unexpected type")]
    TypeMismatch { service: String },
}

impl UserFacingError for ContainerError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ServiceNotRegistered { .. } => {
                Some("Register the service in a configure_services callback.")
            }
            Self::Disposed => Some("Resolve services before the driver is run to completion."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ServiceNotRegistered { .. } => "container.service_not_registered",
            Self::Disposed => "container.disposed",
            Self::ResolutionFailed { .. } => "container.resolution_failed",
            Self::TypeMismatch { .. } => "container.type_mismatch",
        };
        Some(code)
    }
}
