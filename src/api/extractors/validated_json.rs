//! Validated JSON extractor - Sanitizes, deserializes and validates bodies.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::errors::AppError;
use crate::utils::sanitize_value;

/// JSON body that has been sanitized and validated.
///
/// The raw body is parsed into a `serde_json::Value` first so every string
/// goes through [`sanitize_value`] before the typed payload is built.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use user_registry::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateUserRequest {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<CreateUserRequest>) {
///     // payload is already sanitized and validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        let value: T = serde_json::from_value(sanitize_value(raw))
            .map_err(|e| AppError::validation(format!("Invalid request body: {}", e)))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Format validation errors into a user-friendly string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "Nome muito curto"))]
        name: String,
        password: String,
    }

    fn request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_sanitizes_before_validating() {
        let req = request(r#"{"name": "<b>Ana</b>", "password": "<secret>"}"#);
        let ValidatedJson(payload) = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(payload.name, "Ana");
        assert_eq!(payload.password, "<secret>");
    }

    #[tokio::test]
    async fn test_rejects_invalid_payload() {
        let req = request(r#"{"name": "<i>A</i>", "password": "x"}"#);
        let result = ValidatedJson::<Payload>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Nome muito curto"));
    }

    #[tokio::test]
    async fn test_rejects_missing_fields() {
        let req = request(r#"{"name": "Ana"}"#);
        let result = ValidatedJson::<Payload>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let req = request("{not json");
        let result = ValidatedJson::<Payload>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
