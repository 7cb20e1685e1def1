//! Transcheck Common Library
//!
//! Test-case data model and harness configuration shared by the runner and
//! the command-line front end.

pub mod config;
pub mod error;
pub mod types;

pub use config::{BrowserConfig, BrowserKind, DiscoveryConfig, HarnessConfig, TimingConfig};
pub use error::{Error, Result};
pub use types::*;

/// Transcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
