//! Global request-budget middleware.
//!
//! Counts every request entering the public surface against the
//! `(global, "all")` budget, independent of per-client limits — a flood
//! from many IPs still hits this ceiling. Per-scope admission (leads by
//! IP, OTP by identifier) is consulted inside the handlers.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use sn_core::errors::{DomainError, RateLimitExceeded};
use sn_core::services::rate_limit::{Admission, RateLimiter, GLOBAL_IDENTIFIER, SCOPE_GLOBAL};
use sn_core::store::ExpiringStore;

use crate::handlers::error::domain_error_response;

/// Request-budget middleware factory.
pub struct RequestBudget<K: ExpiringStore> {
    limiter: Arc<RateLimiter<K>>,
}

impl<K: ExpiringStore> RequestBudget<K> {
    pub fn new(limiter: Arc<RateLimiter<K>>) -> Self {
        Self { limiter }
    }
}

impl<S, B, K> Transform<S, ServiceRequest> for RequestBudget<K>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    K: ExpiringStore + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestBudgetMiddleware<S, K>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestBudgetMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

/// Request-budget middleware service.
pub struct RequestBudgetMiddleware<S, K: ExpiringStore> {
    service: Rc<S>,
    limiter: Arc<RateLimiter<K>>,
}

impl<S, B, K> Service<ServiceRequest> for RequestBudgetMiddleware<S, K>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    K: ExpiringStore + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        Box::pin(async move {
            match limiter.admit(SCOPE_GLOBAL, GLOBAL_IDENTIFIER).await {
                Admission::Allowed => service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body),
                Admission::Denied {
                    window,
                    retry_after_seconds,
                } => {
                    let error = DomainError::RateLimit(RateLimitExceeded {
                        scope: SCOPE_GLOBAL.to_string(),
                        window: window.as_str().to_string(),
                        retry_after_seconds,
                    });
                    Ok(req
                        .into_response(domain_error_response(&error))
                        .map_into_right_body())
                }
            }
        })
    }
}
