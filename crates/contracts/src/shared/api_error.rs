//! Error taxonomy shared by the REST backend and the admin UI.
//!
//! On the wire an error is `{ "message": "...", "errors": { "field": ["..."] } }`.
//! The UI classifies it into [`ApiError`]:
//! - validation errors carry field-keyed messages shown inline;
//! - server errors carry one message shown as a banner;
//! - network/decode errors fall back to a generic message.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pagination::ShapeError;

/// Field key → first error message
pub type FieldErrors = BTreeMap<String, String>;

/// Messages for one field: the backend sends a list, some sources a single string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessages {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessages {
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s.as_str()),
            Self::Many(list) => list.first().map(String::as_str),
        }
    }
}

/// Error body returned by mutation and list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, ErrorMessages>>,
}

impl ApiErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn validation(message: impl Into<String>, fields: &FieldErrors) -> Self {
        let errors = fields
            .iter()
            .map(|(k, v)| (k.clone(), ErrorMessages::Many(vec![v.clone()])))
            .collect();
        Self {
            message: Some(message.into()),
            errors: Some(errors),
        }
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.errors
            .iter()
            .flatten()
            .filter_map(|(k, v)| v.first().map(|m| (k.clone(), m.to_string())))
            .collect()
    }
}

/// Classified failure of a request to the backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response by status and body text
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
        let Some(parsed) = parsed else {
            return Self::Server {
                status,
                message: default_message(status).to_string(),
            };
        };

        let fields = parsed.field_errors();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message(status).to_string());

        if fields.is_empty() {
            Self::Server { status, message }
        } else {
            Self::Validation { message, fields }
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Text for the banner/alert shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::Server { message, .. } => message.clone(),
            Self::Network(_) => "Сервер недоступен. Повторите попытку позже".to_string(),
            Self::Decode(_) => "Не удалось обработать ответ сервера".to_string(),
        }
    }
}

impl From<ShapeError> for ApiError {
    fn from(e: ShapeError) -> Self {
        Self::Decode(e.to_string())
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Некорректный запрос",
        403 => "Операция запрещена",
        404 => "Запись не найдена",
        413 => "Файл слишком большой",
        422 => "Проверьте заполнение полей",
        _ => "Ошибка сервера",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_yields_field_errors() {
        let err = ApiError::from_response(
            422,
            r#"{"message":"Проверьте заполнение полей","errors":{"code":["Код уже используется"],"name":"Пусто"}}"#,
        );
        let fields = err.field_errors().expect("validation error");
        assert_eq!(fields.get("code").map(String::as_str), Some("Код уже используется"));
        assert_eq!(fields.get("name").map(String::as_str), Some("Пусто"));
        assert_eq!(err.user_message(), "Проверьте заполнение полей");
    }

    #[test]
    fn message_without_fields_is_a_server_error() {
        let err = ApiError::from_response(403, r#"{"message":"Нельзя удалить суперадминистратора"}"#);
        assert_eq!(
            err,
            ApiError::Server {
                status: 403,
                message: "Нельзя удалить суперадминистратора".into()
            }
        );
    }

    #[test]
    fn unparsable_body_falls_back_to_status_text() {
        let err = ApiError::from_response(502, "<html>Bad gateway</html>");
        assert_eq!(err.user_message(), "Ошибка сервера");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn body_round_trips_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), "Наименование не может быть пустым".into());
        let body = ApiErrorBody::validation("Проверьте заполнение полей", &fields);
        let text = serde_json::to_string(&body).unwrap();
        let err = ApiError::from_response(422, &text);
        assert_eq!(err.field_errors(), Some(&fields));
    }
}
