#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Process bootstrap for console applications
//!
//! A [`ConsoleDriverBuilder`] collects callbacks and runs them once in
//! [`ConsoleDriverBuilder::build`]:
//!
//! 1. bootstrap configuration, which decides the [`HostEnvironment`]
//! 2. app configuration, layered over the bootstrap configuration
//! 3. service registrations and container callbacks, producing a
//!    [`ServiceProvider`](driveline_container::ServiceProvider)
//!
//! The resulting [`ConsoleDriver`] runs every registered [`Driver`] in
//! order and returns the last non-zero exit code.
//!
//! ```no_run
//! use driveline_host::{create_default_builder, driver_fn};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> driveline_errors::Result<i32> {
//! let mut builder = create_default_builder(std::env::args().skip(1));
//! builder.add_driver(driver_fn("hello", |_args, _cancel| async {
//!     Ok::<_, driveline_errors::Error>(0)
//! }));
//! builder.run(CancellationToken::new()).await
//! # }
//! ```

mod adapter;
pub mod builder;
pub mod context;
pub mod defaults;
pub mod driver;
pub mod environment;
pub mod file_provider;
pub mod logging;

pub use adapter::ContainerBuilderHandle;
pub use builder::ConsoleDriverBuilder;
pub use context::{BuilderContext, Properties};
pub use defaults::{create_default_builder, ENVIRONMENT_VARIABLE_PREFIX, SETTINGS_FILE_STEM};
pub use driver::{aggregate_exit_codes, driver_fn, ConsoleDriver, Driver, FnDriver};
pub use environment::{resolve_content_root, HostEnvironment};
pub use file_provider::{FileInfo, FileProvider, PhysicalFileProvider};
pub use logging::{bind_logging_options, init_tracing, LogFormat, LoggingOptions};

pub use tokio_util::sync::CancellationToken;
