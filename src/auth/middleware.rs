use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage, ResponseError};

use super::error::AuthError;
use super::model::Principal;
use crate::AppState;

/// Extract the token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

fn authorize(req: &ServiceRequest) -> Result<Principal, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(AuthError::InvalidToken)?;
    state.tokens.verify(token)
}

/// Gate for the contract generation route. The verified [`Principal`] is
/// stored in the request extensions.
pub async fn require_contract_token<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    match authorize(&req) {
        Ok(principal) => {
            log::debug!("Contract request authorized as {:?}", principal);
            req.extensions_mut().insert(principal);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(e) => {
            log::warn!("Rejected contract request to {}: {}", req.path(), e);
            Ok(req.into_response(e.error_response()).map_into_right_body())
        }
    }
}

/// Extension trait for requests to get the authorized principal.
pub trait PrincipalExt {
    fn principal(&self) -> Option<Principal>;
}

impl<T: HttpMessage> PrincipalExt for T {
    fn principal(&self) -> Option<Principal> {
        self.extensions().get::<Principal>().copied()
    }
}
