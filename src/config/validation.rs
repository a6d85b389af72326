//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Validate CORS method names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::Method;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("unknown HTTP method in cors.allowed_methods: {0}")]
    InvalidMethod(String),

    #[error("cors.allowed_methods is empty while CORS is enabled")]
    NoCorsMethods,
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.cors.enabled {
        if config.cors.allowed_methods.is_empty() {
            errors.push(ValidationError::NoCorsMethods);
        }
        for method in &config.cors.allowed_methods {
            if parse_method(method).is_none() {
                errors.push(ValidationError::InvalidMethod(method.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a configured method name; names are matched case-insensitively.
pub fn parse_method(name: &str) -> Option<Method> {
    let upper = name.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.timeouts.request_secs = 0;
        config.cors.allowed_methods = vec!["GET".to_string(), "GE T".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::InvalidMethod("GE T".to_string())));
    }

    #[test]
    fn test_cors_methods_ignored_when_disabled() {
        let mut config = ServiceConfig::default();
        config.cors.enabled = false;
        config.cors.allowed_methods.clear();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_parse_method_case_insensitive() {
        assert_eq!(parse_method("patch"), Some(Method::PATCH));
        assert_eq!(parse_method(""), None);
    }
}
