#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Type-keyed dependency container for driveline
//!
//! Services are registered on a [`ServiceCollection`] and resolved through a
//! [`ServiceProvider`]. Every service is handed out as an `Arc<T>`; `T` may be
//! a trait object. Other containers plug in through
//! [`ServiceProviderFactory`].

mod collection;
mod factory;
mod options;
mod provider;

pub use collection::{ServiceCollection, ServiceDescriptor, ServiceLifetime};
pub use factory::{DefaultServiceProviderFactory, ServiceProviderFactory};
pub use options::{ConfigureOptions, Options};
pub use provider::{ServiceProvider, ServiceProviderOptions};
