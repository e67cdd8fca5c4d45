//! Command-line arguments captured at process start

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Immutable, ordered sequence of arguments shared with every driver.
///
/// Cloning is cheap; all clones share the same backing slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CommandLineArguments {
    args: Arc<[String]>,
}

impl CommandLineArguments {
    /// Capture the given arguments
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Capture the current process arguments without the program name
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    /// Borrow the arguments as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }
}

impl Deref for CommandLineArguments {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.args
    }
}

impl<S: Into<String>> FromIterator<S> for CommandLineArguments {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
