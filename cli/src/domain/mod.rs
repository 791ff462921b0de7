//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod conserver;
pub mod error;
pub mod ini;
pub mod instance;
pub mod site;
pub mod status;
pub mod units;

pub use config::{Launcher, Scope, ToolPaths};
pub use error::{ConfigError, ExternalCommandError, GenerateError, InstanceError, SiteProfileError};
pub use instance::{Definitions, Endpoint, InstanceDefinition};
