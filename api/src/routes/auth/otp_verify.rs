use actix_web::{web, HttpResponse};
use validator::Validate;

use sn_core::store::ExpiringStore;

use crate::dto::auth::{OtpVerifyRequest, TokenResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/otp/verify
///
/// Second step of the OTP-gated login: verifies the delivered code and
/// issues the token pair. The challenge is single-use; a verified code
/// cannot be replayed.
///
/// # Request Body
///
/// ```json
/// {
///     "username": "0901234567",
///     "otp_code": "123456"
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
/// - 400 Bad Request: malformed body
/// - 401 Unauthorized: wrong, expired, or missing code (one response for
///   all three — the endpoint does not confirm whether a challenge exists)
/// - 429 Too Many Requests: attempt budget exhausted
pub async fn otp_verify<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    request: web::Json<OtpVerifyRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state
        .auth_service
        .verify_otp_and_login(&request.username, &request.otp_code)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(TokenResponse::from(response)),
        Err(error) => domain_error_response(&error),
    }
}
