use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use jsonwebtoken::errors::Error as JsonWebTokenError;
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Permission(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("jwt error: {0}")]
    Jwt(#[from] JsonWebTokenError),

    #[error("dotenv error: {0}")]
    DotEnv(#[from] dotenv::Error),

    #[error("notifier error: {0}")]
    Notifier(String),
}

// A unique violation carries the same meaning as a failed duplicate
// pre-check, so it surfaces as a conflict instead of a bare 500.
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Error::NotFound("record not found".into()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => Error::Conflict("duplicate record".into()),
            _ => Error::Database(e),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Permission(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Jwt(_) => StatusCode::UNAUTHORIZED,
            Error::Database(_) | Error::DotEnv(_) | Error::Notifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}
