//! Input shape checks shared by the handlers.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use ucode_common::HttpConfig;

use crate::response::{ApiError, ApiResult};

static PHONE_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$").ok()
});

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").ok());

pub fn is_valid_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.as_ref().is_some_and(|re| re.is_match(value))
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Reject a value that is not a UUID, naming the offending field.
pub fn require_uuid<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    if is_valid_uuid(value) {
        Ok(value)
    } else {
        Err(ApiError::invalid_argument(format!(
            "{field} is an invalid uuid"
        )))
    }
}

/// Like [`require_uuid`] for optional inputs; empty counts as absent.
pub fn optional_uuid(field: &str, value: Option<&str>) -> ApiResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => require_uuid(field, v).map(|v| Some(v.to_string())),
        None => Ok(None),
    }
}

/// `None` for empty strings.
pub fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub page: u32,
}

/// Read `limit`, `offset` and `page` from query parameters.
pub fn parse_pagination(
    params: &HashMap<String, String>,
    defaults: &HttpConfig,
) -> ApiResult<Pagination> {
    Ok(Pagination {
        limit: parse_count(params, "limit", defaults.default_limit)?,
        offset: parse_count(params, "offset", defaults.default_offset)?,
        page: parse_count(params, "page", 1)?,
    })
}

fn parse_count(params: &HashMap<String, String>, name: &str, default: u32) -> ApiResult<u32> {
    match params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::invalid_argument(format!("{name} must be a non-negative integer"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    #[test]
    fn test_uuid() {
        assert!(is_valid_uuid("5f0e2a8c-1c4b-4f5e-9a7d-3b2c1d0e9f8a"));
        assert!(!is_valid_uuid("not-a-uuid"));
        assert!(!is_valid_uuid(""));

        let err = require_uuid("fare_id", "nope").unwrap_err();
        assert_eq!(err.status(), Status::InvalidArgument);
        assert_eq!(err.message(), "fare_id is an invalid uuid");
    }

    #[test]
    fn test_optional_uuid() {
        assert_eq!(optional_uuid("version_id", None).unwrap(), None);
        assert_eq!(optional_uuid("version_id", Some("")).unwrap(), None);
        assert!(optional_uuid("version_id", Some("bad")).is_err());
        assert_eq!(
            optional_uuid("version_id", Some("5f0e2a8c-1c4b-4f5e-9a7d-3b2c1d0e9f8a")).unwrap(),
            Some("5f0e2a8c-1c4b-4f5e-9a7d-3b2c1d0e9f8a".to_string())
        );
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+998901234567"));
        assert!(is_valid_phone("(555) 123-4567"));
        assert!(is_valid_phone("555.123.4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("phone"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("dev@u-code.io"));
        assert!(!is_valid_email("dev@localhost"));
        assert!(!is_valid_email("@u-code.io"));
    }

    #[test]
    fn test_pagination_defaults() {
        let defaults = HttpConfig::default();
        let page = parse_pagination(&HashMap::new(), &defaults).unwrap();
        assert_eq!(page, Pagination { limit: 10, offset: 0, page: 1 });
    }

    #[test]
    fn test_pagination_explicit_and_invalid() {
        let defaults = HttpConfig::default();
        let mut params = HashMap::new();
        params.insert("limit".to_string(), "25".to_string());
        params.insert("offset".to_string(), "50".to_string());
        let page = parse_pagination(&params, &defaults).unwrap();
        assert_eq!(page.limit, 25);
        assert_eq!(page.offset, 50);

        params.insert("limit".to_string(), "-1".to_string());
        let err = parse_pagination(&params, &defaults).unwrap_err();
        assert_eq!(err.status(), Status::InvalidArgument);
    }
}
