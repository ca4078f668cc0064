use actix_web::{web, HttpResponse};
use validator::Validate;

use sn_core::store::ExpiringStore;

use crate::dto::auth::{LoginRequest, TokenResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/login
///
/// Direct password login, bypassing the OTP step.
///
/// # Request Body
///
/// ```json
/// {
///     "username": "0901234567",
///     "password": "********"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJhbGciOiJIUzI1NiIs...",
///     "refresh_token": "eyJhbGciOiJIUzI1NiIs...",
///     "token_type": "Bearer",
///     "expires_in": 3600,
///     "expires_at": "2025-01-01T13:00:00Z",
///     "user_info": { "id": "...", "username": "0901234567", "role": "staff" }
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: malformed body or identifier
/// - 401 Unauthorized: wrong username or password
/// - 503 Service Unavailable: security state store unreachable
pub async fn login<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state
        .auth_service
        .login(&request.username, &request.password)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(TokenResponse::from(response)),
        Err(error) => domain_error_response(&error),
    }
}
