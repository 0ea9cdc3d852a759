//! uCode Common - Shared configuration, errors, and logging for the uCode API gateway.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, DelegationConfig, GrpcConfig, HistoryConfig, HttpConfig, MinioConfig, N8nConfig,
    ObservabilityConfig, RedisConfig, ResolverConfig, RunMode, ServiceNodeConfig,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, RunMode, ServiceNodeConfig};
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::logging::init_logging;
    pub use crate::validation::{Validate, ValidationError};
}
