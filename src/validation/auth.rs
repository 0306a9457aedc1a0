use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/auth/login` and `POST /api/auth/signup`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::flatten_errors;

    #[test]
    fn accepts_well_formed_credentials() {
        let creds = Credentials {
            email: "instructor@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn reports_each_bad_field() {
        let creds: Credentials = serde_json::from_str(r#"{"email":"not-an-email","password":"short"}"#).unwrap();
        let errors = flatten_errors(&creds.validate().unwrap_err());
        assert!(errors.contains_key("email"));
        assert_eq!(errors["password"], vec!["Password must be at least 8 characters".to_string()]);
    }

    #[test]
    fn missing_fields_fail_validation_not_parsing() {
        let creds: Credentials = serde_json::from_str("{}").unwrap();
        let errors = flatten_errors(&creds.validate().unwrap_err());
        assert_eq!(errors.len(), 2);
    }
}
