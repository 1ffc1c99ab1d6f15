use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::api_types::ApiErrorResponse;

#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    Pool(r2d2::Error),
    Validation(Vec<String>),
    Unauthorized,
    NoMembership,
    PermissionDenied(String),
    NotFound,
    Hash(String),
    Session(String),
    Upstream(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Pool(e) => write!(f, "Pool error: {e}"),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.join("; ")),
            AppError::Unauthorized => write!(f, "Not authenticated"),
            AppError::NoMembership => write!(f, "No choir membership"),
            AppError::PermissionDenied(role) => write!(f, "Requires role: {role}"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Upstream(e) => write!(f, "Upstream error: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::BadRequest().json(ApiErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.join("; ")),
            }),
            AppError::Unauthorized | AppError::Session(_) => {
                HttpResponse::Unauthorized().json(ApiErrorResponse {
                    error: "Not authenticated".to_string(),
                    details: None,
                })
            }
            AppError::NoMembership => HttpResponse::Forbidden().json(ApiErrorResponse {
                error: "No choir membership".to_string(),
                details: None,
            }),
            AppError::PermissionDenied(role) => HttpResponse::Forbidden().json(ApiErrorResponse {
                error: "Insufficient role".to_string(),
                details: Some(format!("requires {role}")),
            }),
            AppError::NotFound => HttpResponse::NotFound().json(ApiErrorResponse {
                error: "Not found".to_string(),
                details: None,
            }),
            // Internal details are logged server-side, never echoed to the client.
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().json(ApiErrorResponse {
                    error: "Internal server error".to_string(),
                    details: None,
                })
            }
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Pool(e)
    }
}
