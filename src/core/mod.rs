//! Core module - errors, configuration and logging shared by all components

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigError, ConfigLayer, LabConfig, Limits};
pub use error::{ConfigurationError, LabError};
pub use logging::init_logging;
