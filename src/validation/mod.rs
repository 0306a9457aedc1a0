//! Request payload schemas and the `ValidatedJson` extractor.
//!
//! Shape and per-field rules come from `validator` derives; rules spanning
//! several fields (problem type vs. options) live next to their schema.

pub mod auth;
pub mod invitation;
pub mod problem;
pub mod tenant;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{ApiError, FieldErrors};

pub use auth::Credentials;
pub use invitation::{AcceptInvitationRequest, CreateInvitationRequest};
pub use problem::{ProblemOptionPayload, ProblemPayload};
pub use tenant::CreateTenantRequest;

/// JSON body that has passed its schema's `validate()`
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Build a `ValidationError` carrying a client-facing message
pub(crate) fn issue(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Flatten nested validation errors into `field -> messages`, using the
/// camelCase names clients send (`options[1].label`, `textAnswer`).
pub fn flatten_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    collect(errors, None, &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = camel_case(field);
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name,
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = out.entry(path).or_default();
                messages.extend(errs.iter().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_become_camel_case() {
        assert_eq!(camel_case("text_answer"), "textAnswer");
        assert_eq!(camel_case("is_correct"), "isCorrect");
        assert_eq!(camel_case("slug"), "slug");
        assert_eq!(camel_case("type_"), "type");
    }

    #[test]
    fn flattens_top_level_issues() {
        let mut errors = ValidationErrors::new();
        errors.add("text_answer", issue("required", "A model answer is required"));
        let flat = flatten_errors(&errors);
        assert_eq!(flat["textAnswer"], vec!["A model answer is required".to_string()]);
    }
}
