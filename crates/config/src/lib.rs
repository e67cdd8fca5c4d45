#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Layered configuration for driveline
//!
//! A [`ConfigurationBuilder`] holds an ordered list of sources. Building it
//! loads every source in registration order into one immutable
//! [`Configuration`] view:
//! - In-memory key/value pairs
//! - A previously built configuration (chained)
//! - Environment variables, optionally filtered by prefix
//! - Command-line arguments
//! - TOML and JSON settings files, including per-user secrets
//!
//! Later sources override earlier ones for the same key. Keys are compared
//! case-insensitively and `:` separates hierarchy levels.

pub mod builder;
pub mod command_line;
pub mod constants;
pub mod env;
pub mod file;
pub mod root;

pub use builder::{ChainedSource, ConfigurationBuilder, ConfigurationSource, MemorySource};
pub use command_line::CommandLineSource;
pub use env::EnvironmentVariablesSource;
pub use file::{user_secrets_path, FileFormat, FileSource};
pub use root::{Configuration, ConfigurationSection};
