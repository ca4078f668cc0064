//! Application factory.
//!
//! Builds the actix application with the fixed middleware order:
//! CORS first, then the global request budget, then request tracing,
//! then routing. JWT auth wraps only the routes that need a bearer
//! token.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, Error, HttpResponse};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use sn_core::services::auth::AccessTokenValidator;
use sn_core::store::ExpiringStore;
use sn_shared::config::{Environment, ServerConfig};

use crate::middleware::{create_cors, JwtAuth, RequestBudget};
use crate::routes::auth::{change_password, login, logout, otp_request, otp_verify, refresh};
use crate::routes::lead::create_lead;
use crate::routes::AppState;

/// Create and configure the application with all dependencies.
pub fn create_app<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    environment: Environment,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let validator: Arc<dyn AccessTokenValidator> = state.auth_service.clone();
    let cors = create_cors(environment, server);
    let budget = RequestBudget::new(state.rate_limiter.clone());

    App::new()
        .app_data(state)
        // Middleware run in reverse registration order: CORS first,
        // then the request budget, then tracing
        .wrap(TracingLogger::default())
        .wrap(budget)
        .wrap(cors)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/login", web::post().to(login::<K>))
                        .route("/otp/request", web::post().to(otp_request::<K>))
                        .route("/otp/verify", web::post().to(otp_verify::<K>))
                        .route("/refresh", web::post().to(refresh::<K>))
                        .route(
                            "/logout",
                            web::post()
                                .to(logout::<K>)
                                .wrap(JwtAuth::new(validator.clone())),
                        )
                        .route(
                            "/change-password",
                            web::post()
                                .to(change_password::<K>)
                                .wrap(JwtAuth::new(validator)),
                        ),
                )
                .route("/leads", web::post().to(create_lead::<K>)),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "serena-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
