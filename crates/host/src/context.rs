//! State shared with every configuration callback

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use driveline_config::Configuration;
use parking_lot::RwLock;

use crate::environment::HostEnvironment;

type Value = Box<dyn Any + Send + Sync>;

/// String-keyed bag of arbitrary values.
///
/// Keys are plain strings rather than arbitrary objects: a key is
/// anything a caller can name, and two keys match when the strings are
/// equal (case-sensitive). Values stay opaque and are read back with a
/// checked downcast.
///
/// One bag belongs to one builder; the builder and its [`BuilderContext`]
/// hold handles to the same storage, so values set before `build` are
/// visible to callbacks and vice versa.
#[derive(Clone, Default)]
pub struct Properties {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning whether a previous value was replaced
    pub fn insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) -> bool {
        self.values
            .write()
            .insert(key.into(), Box::new(value))
            .is_some()
    }

    /// Clone out a value of type `T`; `None` if absent or of another type
    #[must_use]
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.values.read().get(key)?.downcast_ref::<T>().cloned()
    }

    /// Borrow a value of type `T` for the duration of `f`
    pub fn with<T: Any, R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let values = self.values.read();
        values.get(key)?.downcast_ref::<T>().map(f)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Remove a value, returning whether one was present
    pub fn remove(&self, key: &str) -> bool {
        self.values.write().remove(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.read();
        let mut keys: Vec<&String> = values.keys().collect();
        keys.sort();
        f.debug_struct("Properties").field("keys", &keys).finish()
    }
}

/// Environment, configuration, and properties seen by builder callbacks.
///
/// The configuration starts as the bootstrap view and is replaced by the
/// app view once the app pass finishes; nothing else changes after creation.
#[derive(Debug, Clone)]
pub struct BuilderContext {
    environment: Arc<HostEnvironment>,
    configuration: Configuration,
    properties: Properties,
}

impl BuilderContext {
    pub(crate) fn new(
        environment: Arc<HostEnvironment>,
        configuration: Configuration,
        properties: Properties,
    ) -> Self {
        Self {
            environment,
            configuration,
            properties,
        }
    }

    #[must_use]
    pub fn environment(&self) -> &Arc<HostEnvironment> {
        &self.environment
    }

    /// Bootstrap view during the app pass, app view afterwards
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub(crate) fn set_configuration(&mut self, configuration: Configuration) {
        self.configuration = configuration;
    }
}
