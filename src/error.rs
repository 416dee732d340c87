use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeraError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Yetersiz stok: {0}")]
    Stock(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Errors cross the wire as their message string.
impl Serialize for SeraError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type SeraResult<T> = Result<T, SeraError>;

impl IntoResponse for SeraError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            SeraError::Database(ref e) => {
                tracing::error!("Database Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Veritabanı hatası oluştu.".to_string(),
                )
            }
            SeraError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            SeraError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            SeraError::Stock(msg) => (StatusCode::CONFLICT, format!("Yetersiz stok: {}", msg)),
            SeraError::Internal(msg) => {
                tracing::error!("Internal Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Sunucu iç hatası oluştu.".to_string(),
                )
            }
            SeraError::Io(e) => {
                tracing::error!("IO Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Dosya sistemi hatası oluştu.".to_string(),
                )
            }
            _ => {
                tracing::error!("Unhandled Error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Bilinmeyen bir hata oluştu.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
