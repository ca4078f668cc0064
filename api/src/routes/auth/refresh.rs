use actix_web::{web, HttpResponse};
use validator::Validate;

use sn_core::store::ExpiringStore;

use crate::dto::auth::{RefreshRequest, TokenResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. Rotation with revocation:
/// the submitted refresh token is blacklisted as part of the exchange,
/// so replaying it afterwards fails with 401.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJhbGciOiJIUzI1NiIs..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// Same token payload as login.
///
/// ## Errors
/// - 400 Bad Request: malformed body
/// - 401 Unauthorized: invalid, expired, or revoked refresh token
/// - 503 Service Unavailable: rotation could not be recorded
pub async fn refresh<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    request: web::Json<RefreshRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state.auth_service.refresh(&request.refresh_token).await {
        Ok(response) => HttpResponse::Ok().json(TokenResponse::from(response)),
        Err(error) => domain_error_response(&error),
    }
}
