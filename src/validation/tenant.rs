use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::issue;

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Body of `POST /api/tenants`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(
        length(min = 2, message = "Slug must be at least 2 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: String,
}

/// Lowercase letters, digits and hyphens only
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        Err(issue("slug", "Use lowercase letters, digits and hyphens only"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, slug: &str) -> CreateTenantRequest {
        CreateTenantRequest {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn slug_rules() {
        assert!(request("Acme", "acme-1").validate().is_ok());
        assert!(request("Acme", "Acme!").validate().is_err());
        assert!(request("Acme", "a").validate().is_err());
        assert!(request("Acme", "acme corp").validate().is_err());
    }

    #[test]
    fn name_is_required() {
        let errors = request("", "acme").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
