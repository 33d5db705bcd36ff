use crate::utils::error::{ImportError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> ImportError {
    ImportError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Accepts absolute http(s) URLs only; the dispatcher posts to it as-is.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }
    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        Err(invalid(field_name, path, "Path cannot be empty"))
    } else if path.contains('\0') {
        Err(invalid(field_name, path, "Path contains null bytes"))
    } else {
        Ok(())
    }
}

pub fn validate_min(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// Column names are matched exactly, so whitespace-only names can never hit.
pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field_name,
            value,
            format!("Expected one of: {}", allowed.join(", ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("dispatch.endpoint", "https://example.com/jobs").is_ok());
        assert!(validate_url("dispatch.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("dispatch.endpoint", "").is_err());
        assert!(validate_url("dispatch.endpoint", "invalid-url").is_err());

        let err = validate_url("dispatch.endpoint", "ftp://example.com").unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidConfigValueError { field, reason, .. }
                if field == "dispatch.endpoint" && reason.contains("ftp")
        ));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("store.path", "./products.json").is_ok());
        assert!(validate_path("store.path", "").is_err());
        assert!(validate_path("store.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_min() {
        assert!(validate_min("dispatch.timeout_seconds", 5, 1).is_ok());
        assert!(validate_min("dispatch.timeout_seconds", 1, 1).is_ok());

        let err = validate_min("dispatch.timeout_seconds", 0, 1).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidConfigValueError { value, .. } if value == "0"
        ));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("columns.quantity", "qty").is_ok());
        assert!(validate_non_empty_string("columns.quantity", "   ").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("logging.format", "json", &["compact", "json"]).is_ok());
        assert!(validate_one_of("logging.format", "xml", &["compact", "json"]).is_err());
    }
}
