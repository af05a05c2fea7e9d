use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult, field_messages};

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Whether absent fields of an input keep their stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}

/// A field value as the client sent it. A value of the wrong JSON type is
/// kept as `Invalid` so it is reported next to the other field errors
/// instead of rejecting the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted<T> {
    Valid(T),
    Invalid,
}

impl<T> Submitted<T> {
    pub fn valid(self) -> Option<T> {
        match self {
            Submitted::Valid(value) => Some(value),
            Submitted::Invalid => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Submitted<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).map_or(Submitted::Invalid, Submitted::Valid))
    }
}

/// A `ValidationError` carrying a ready-made message.
pub fn field_error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let message: String = message.into();
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Checks an input shape needs beyond per-field `validator` rules.
pub trait CheckedInput: Validate {
    /// Required fields absent from the payload.
    fn missing_fields(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Per-field failures the derive cannot express, such as a value of
    /// the wrong type. Reported in both write modes.
    fn field_errors(&self) -> Vec<(&'static str, ValidationError)> {
        Vec::new()
    }

    /// Rules spanning several fields. They run on full writes even when
    /// field validation already failed, so a client gets every problem
    /// with a payload in one response.
    fn object_errors(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Field errors, required-field errors included, sorted by field name and
/// followed by the object-level errors.
pub fn check<T: CheckedInput>(value: &T, mode: WriteMode) -> AppResult<()> {
    let mut field_errors = value.validate().err().unwrap_or_else(ValidationErrors::new);

    for (field, error) in value.field_errors() {
        field_errors.add(field, error);
    }
    if mode == WriteMode::Full {
        for field in value.missing_fields() {
            field_errors.add(field, field_error("required", REQUIRED_MESSAGE));
        }
    }

    let mut errors = field_messages(&field_errors);
    if mode == WriteMode::Full {
        errors.extend(value.object_errors());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationErrors { errors })
    }
}

/// JSON body extractor that runs [`check`] before the handler sees the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + CheckedInput,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest {
                message: rejection.body_text(),
            })?;
        check(&value, WriteMode::Full)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Window {
        #[validate(length(min = 1, message = "This field may not be blank."))]
        label: String,
        #[validate(range(min = 1, max = 12, message = "Ensure this value is between 1 and 12."))]
        from: i16,
        #[validate(range(min = 1, max = 12, message = "Ensure this value is between 1 and 12."))]
        to: i16,
    }

    impl CheckedInput for Window {
        fn object_errors(&self) -> Vec<String> {
            if self.from > self.to {
                vec!["from must not be after to.".to_string()]
            } else {
                Vec::new()
            }
        }
    }

    fn json_request(body: &str, content_type: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_submitted_keeps_wrong_types_as_invalid() {
        #[derive(Debug, Deserialize)]
        struct Form {
            count: Option<Submitted<i64>>,
            flag: Option<Submitted<bool>>,
        }

        let form: Form = serde_json::from_str(r#"{"count": 40000, "flag": "yes"}"#).unwrap();
        assert_eq!(form.count, Some(Submitted::Valid(40000)));
        assert_eq!(form.flag, Some(Submitted::Invalid));

        let form: Form = serde_json::from_str(r#"{"count": "May", "flag": null}"#).unwrap();
        assert_eq!(form.count, Some(Submitted::Invalid));
        assert_eq!(form.flag, None);
        assert_eq!(Submitted::Valid(3).valid(), Some(3));
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = json_request(r#"{"label":"q1","from":1,"to":3}"#, "application/json");
        let ValidatedJson(window) = ValidatedJson::<Window>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(window.label, "q1");
    }

    #[tokio::test]
    async fn test_field_and_object_errors_are_collected_together() {
        let req = json_request(r#"{"label":"","from":13,"to":2}"#, "application/json");

        match ValidatedJson::<Window>::from_request(req, &()).await {
            Err(AppError::ValidationErrors { errors }) => assert_eq!(
                errors,
                vec![
                    "from: Ensure this value is between 1 and 12.".to_string(),
                    "label: This field may not be blank.".to_string(),
                    "from must not be after to.".to_string(),
                ]
            ),
            other => panic!("Expected ValidationErrors, got {:?}", other.map(|v| v.0)),
        }
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let req = json_request(r#"{"label":"q1","from":1}"#, "application/json");

        match ValidatedJson::<Window>::from_request(req, &()).await {
            Err(AppError::BadRequest { message }) => assert!(!message.is_empty()),
            other => panic!("Expected BadRequest, got {:?}", other.map(|v| v.0)),
        }
    }

    #[tokio::test]
    async fn test_wrong_content_type_is_bad_request() {
        let req = json_request(r#"{"label":"q1","from":1,"to":2}"#, "text/plain");

        assert!(matches!(
            ValidatedJson::<Window>::from_request(req, &()).await,
            Err(AppError::BadRequest { .. })
        ));
    }
}
