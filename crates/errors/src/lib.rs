#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Errors shared by every driveline crate
//!
//! Each stage of the bootstrap has its own enum: configuration loading,
//! the service container, the single-use build, and the driver loop.
//! [`Error`] folds them together so `?` works across crate boundaries.
//! Values are `Clone` because a failure is reported twice, once through
//! the event channel and once to the caller.

use std::borrow::Cow;

use thiserror::Error;

pub mod build;
pub mod config;
pub mod container;
pub mod driver;

pub use build::BuildError;
pub use config::ConfigError;
pub use container::ContainerError;
pub use driver::DriverError;

/// Any failure surfaced by building or running a console driver
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("invalid argument {argument}: {reason}")]
    InvalidArgument { argument: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A registration call received an unusable value, such as an empty name
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O failure and remember which path it concerned
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

/// Shorthand used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// How an error presents itself to someone running the program.
///
/// The event channel turns these into a `FailureContext` and the demo
/// binary prints them after `Error:`.
pub trait UserFacingError {
    fn user_message(&self) -> Cow<'_, str>;

    /// What to change before trying again, if anything obvious applies
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// True when the same call may succeed later without any change
    fn is_retryable(&self) -> bool {
        false
    }

    /// Dotted identifier such as `config.parse`
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Build(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Container(err) => err.user_message(),
            Error::Driver(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Build(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Container(err) => err.user_hint(),
            Error::Driver(err) => err.user_hint(),
            Error::InvalidArgument { .. } => Some("Pass a non-empty value when registering."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Config(err) => err.is_retryable(),
            Error::Driver(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Build(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Container(err) => err.user_code(),
            Error::Driver(err) => err.user_code(),
            Error::InvalidArgument { .. } => Some("error.invalid_argument"),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
