//! Configuration validation for the gateway.
//!
//! Checks that every endpoint the gateway dials is present and well formed
//! before any channel is opened.

use std::collections::HashSet;
use thiserror::Error;

use crate::config::{
    Config, DelegationConfig, HistoryConfig, HttpConfig, ObservabilityConfig, ServiceNodeConfig,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port} for {field}: must be between 1 and 65535")]
    InvalidPort { port: u16, field: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.http.validate() {
            errors.push(e);
        }
        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }
        if let Err(e) = self.history.validate() {
            errors.push(e);
        }
        if let Err(e) = self.auth.validate() {
            errors.push(e);
        }
        if let Err(e) = validate_endpoint("auth_service", &self.auth_service) {
            errors.push(e);
        }
        if let Err(e) = validate_endpoint("company_service", &self.company_service) {
            errors.push(e);
        }
        for node in &self.service_nodes {
            if let Err(e) = node.validate() {
                errors.push(e);
            }
        }
        if let Err(e) = self.check_namespaces() {
            errors.push(e);
        }
        if !self.redis.url.is_empty() {
            if let Err(e) = validate_url("redis.url", &self.redis.url, &["redis", "rediss"]) {
                errors.push(e);
            }
        }
        if !self.n8n.base_url.is_empty() {
            if let Err(e) = validate_url("n8n.base_url", &self.n8n.base_url, &["http", "https"]) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Namespaces must be unique and the shared one must exist.
    fn check_namespaces(&self) -> ValidationResult<()> {
        let mut seen = HashSet::new();
        for node in &self.service_nodes {
            if !seen.insert(node.namespace.as_str()) {
                return Err(ValidationError::Conflict {
                    reason: format!("namespace '{}' is configured more than once", node.namespace),
                });
            }
        }

        if self.default_namespace.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "default_namespace".into(),
            });
        }

        if !seen.contains(self.default_namespace.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "default_namespace".into(),
                reason: format!(
                    "no service_nodes entry for namespace '{}'",
                    self.default_namespace
                ),
            });
        }

        Ok(())
    }

    /// Load and validate configuration.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for HttpConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "http.port".into(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "http.host".into(),
            });
        }
        if self.default_limit == 0 {
            return Err(ValidationError::InvalidValue {
                field: "http.default_limit".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        match self.log_format.as_str() {
            "json" | "pretty" => {}
            other => {
                return Err(ValidationError::InvalidValue {
                    field: "observability.log_format".into(),
                    reason: format!("'{other}' is not one of json, pretty"),
                })
            }
        }
        match self.log_level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("'{other}' is not a log level"),
            }),
        }
    }
}

impl Validate for HistoryConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidValue {
                field: "history.queue_capacity".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

impl Validate for DelegationConfig {
    fn validate(&self) -> ValidationResult<()> {
        for peer in &self.trusted_peers {
            if peer.parse::<std::net::IpAddr>().is_err() {
                return Err(ValidationError::InvalidValue {
                    field: "auth.trusted_peers".into(),
                    reason: format!("'{peer}' is not an IP address"),
                });
            }
        }
        Ok(())
    }
}

impl Validate for ServiceNodeConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "service_nodes[].namespace".into(),
            });
        }
        for (name, endpoint) in self.endpoints() {
            validate_endpoint(&format!("service_nodes[{}].{name}", self.namespace), endpoint)?;
        }
        if let Some(enterprise) = &self.enterprise_object_builder {
            validate_endpoint(
                &format!("service_nodes[{}].enterprise_object_builder", self.namespace),
                enterprise,
            )?;
        }
        Ok(())
    }
}

fn validate_endpoint(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    validate_url(field, value, &["http", "https"])
}

fn validate_url(field: &str, value: &str, schemes: &[&str]) -> ValidationResult<()> {
    let parsed = url::Url::parse(value).map_err(|e| ValidationError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    if !schemes.contains(&parsed.scheme()) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("scheme must be one of {schemes:?}"),
        });
    }
    Ok(())
}
