//! Options pattern: a default value refined by ordered configure actions

use std::fmt;
use std::ops::Deref;

use driveline_errors::Result;

use crate::provider::ServiceProvider;

/// Resolved options value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options<T> {
    value: T,
}

impl<T> Options<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Options<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

type ConfigureFn<T> = dyn Fn(&ServiceProvider, &mut T) -> Result<()> + Send + Sync;

/// One configure action for `T`, registered as a multi-registration
pub struct ConfigureOptions<T> {
    action: Box<ConfigureFn<T>>,
}

impl<T> ConfigureOptions<T> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&ServiceProvider, &mut T) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            action: Box::new(action),
        }
    }

    /// Apply the action to `value`
    ///
    /// # Errors
    ///
    /// Propagates the action's error.
    pub fn apply(&self, provider: &ServiceProvider, value: &mut T) -> Result<()> {
        (self.action)(provider, value)
    }
}

impl<T> fmt::Debug for ConfigureOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureOptions")
            .field("target", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
