//! JWT authentication middleware for protecting API endpoints.
//!
//! Extracts the bearer token, runs the composed validity check
//! (signature + expiry + revocation) through `AccessTokenValidator`, and
//! injects an explicit request-scoped `AuthContext` — no ambient
//! "current user" state anywhere. Failures short-circuit into the
//! standard JSON error response.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use sn_core::domain::entities::{Claims, Role};
use sn_core::errors::{DomainError, TokenError};
use sn_core::services::auth::AccessTokenValidator;

use crate::handlers::error::domain_error_response;

/// Authenticated request context injected by the middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Account id from the token subject
    pub user_id: Uuid,

    /// Staff role from the token
    pub role: Role,

    /// Full claim set, needed by logout and change-password to revoke
    /// the very token that authenticated the request
    pub claims: Claims,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::Malformed))?;
        Ok(Self {
            user_id,
            role: claims.role,
            claims,
        })
    }
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<AuthContext>().cloned().ok_or_else(|| {
            let error = DomainError::Token(TokenError::Malformed);
            actix_web::error::InternalError::from_response(
                error.to_string(),
                domain_error_response(&error),
            )
            .into()
        }))
    }
}

/// JWT authentication middleware factory.
pub struct JwtAuth {
    validator: Arc<dyn AccessTokenValidator>,
}

impl JwtAuth {
    pub fn new(validator: Arc<dyn AccessTokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

/// JWT authentication middleware service.
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    validator: Arc<dyn AccessTokenValidator>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let validator = self.validator.clone();

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    return Ok(deny(req, &DomainError::Token(TokenError::Malformed)));
                }
            };

            let claims = match validator.authenticate(&token).await {
                Ok(claims) => claims,
                Err(error) => return Ok(deny(req, &error)),
            };
            let context = match AuthContext::from_claims(claims) {
                Ok(context) => context,
                Err(error) => return Ok(deny(req, &error)),
            };

            req.extensions_mut().insert(context);
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Short-circuit the request with the standard JSON error response.
fn deny<B>(req: ServiceRequest, error: &DomainError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(domain_error_response(error))
        .map_into_right_body()
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
