use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::AlertStatus;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("referenced row does not exist: {0}")]
    MissingReference(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("alert status cannot change from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition { from: AlertStatus, to: AlertStatus },

    #[error("cannot sell {requested} shares of {symbol}: holding {held}")]
    InsufficientQuantity {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for PortfolioError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => PortfolioError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => PortfolioError::MissingReference(msg),
            // rejets des hooks before_save (longueur, décimales, email, ...)
            _ => match err {
                DbErr::Custom(msg) => PortfolioError::InvalidInput(msg),
                other => PortfolioError::Database(other),
            },
        }
    }
}

impl ResponseError for PortfolioError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortfolioError::Validation(_)
            | PortfolioError::MissingReference(_)
            | PortfolioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PortfolioError::Conflict(_) => StatusCode::CONFLICT,
            PortfolioError::NotFound { .. } => StatusCode::NOT_FOUND,
            PortfolioError::InvalidTransition { .. }
            | PortfolioError::InsufficientQuantity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PortfolioError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
