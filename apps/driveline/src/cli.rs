//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;

/// driveline - run console drivers against layered configuration
#[derive(Parser, Debug)]
#[command(name = "driveline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run console drivers against layered configuration")]
#[command(long_about = None)]
pub struct Cli {
    /// Environment name (Development, Staging, Production, ...)
    #[arg(long, short = 'e', env = "DRIVELINE_ENVIRONMENT", value_name = "NAME")]
    pub environment: Option<String>,

    /// Directory settings files are read from
    #[arg(long, value_name = "PATH")]
    pub content_root: Option<PathBuf>,

    /// Print lifecycle events as JSON lines on stderr
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Arguments forwarded to the configuration and to every driver
    /// (for example `--Greeting:Message=hi`)
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}
