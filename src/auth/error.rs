use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::ErrorResponse;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token de autorización requerido")]
    MissingToken,
    #[error("Token de autorización inválido")]
    InvalidToken,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(ErrorResponse::unauthorized(&self.to_string()))
    }
}
