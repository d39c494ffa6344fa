use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::api_error::{ApiErrorBody, FieldErrors};
use sea_orm::DbErr;

use crate::shared::uploads::FormError;

/// Ошибки операций со справочниками и настройками
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown collection `{0}`")]
    UnknownCollection(String),
    #[error("record {0} not found")]
    NotFound(i64),
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("record {0} is protected")]
    Protected(i64),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("upload exceeds {limit} bytes")]
    TooLarge { field: Option<String>, limit: usize },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CatalogError {
    /// Single-field validation failure
    pub fn field(key: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(key.to_string(), message.into());
        Self::Validation(fields)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownCollection(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Protected(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ApiErrorBody {
        match self {
            Self::UnknownCollection(name) => {
                ApiErrorBody::message(format!("Справочник «{}» не найден", name))
            }
            Self::NotFound(_) => ApiErrorBody::message("Запись не найдена"),
            Self::Validation(fields) => {
                ApiErrorBody::validation("Проверьте заполнение полей", fields)
            }
            Self::Protected(_) => ApiErrorBody::message("Эту запись нельзя удалить"),
            Self::BadRequest(msg) => ApiErrorBody::message(msg.clone()),
            Self::TooLarge { field, limit } => {
                let hint = format!("Размер файла не должен превышать {}", megabytes(*limit));
                match field {
                    Some(field) => {
                        let mut fields = FieldErrors::new();
                        fields.insert(field.clone(), hint);
                        ApiErrorBody::validation("Файл слишком большой", &fields)
                    }
                    None => ApiErrorBody::message(hint),
                }
            }
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                ApiErrorBody::message("Внутренняя ошибка сервера")
            }
        }
    }
}

impl From<FormError> for CatalogError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::TooLarge { field, limit } => Self::TooLarge { field, limit },
            FormError::Malformed(e) => Self::BadRequest(format!("Некорректная форма: {}", e)),
        }
    }
}

/// "10 МБ", "1,5 МБ"
fn megabytes(bytes: usize) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{} МБ", mb as u64)
    } else {
        format!("{:.1} МБ", mb).replace('.', ",")
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
