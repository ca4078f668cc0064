use actix_web::{web, HttpResponse};
use validator::Validate;

use sn_core::store::ExpiringStore;

use crate::dto::auth::{LoginRequest, OtpTicketResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/otp/request
///
/// First step of the OTP-gated login. Credentials are checked before any
/// code is generated — the passcode is a second factor, not a substitute
/// for the password.
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
///     "identifier": "090****567",
///     "expires_at": "2025-01-01T12:05:00Z",
///     "next_request_at": "2025-01-01T12:01:00Z"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: malformed body or identifier
/// - 401 Unauthorized: wrong username or password
/// - 429 Too Many Requests: resend cooldown or hourly request limit
/// - 503 Service Unavailable: challenge could not be stored
pub async fn otp_request<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state
        .auth_service
        .request_otp(&request.username, &request.password)
        .await
    {
        Ok(ticket) => HttpResponse::Ok().json(OtpTicketResponse::from(ticket)),
        Err(error) => domain_error_response(&error),
    }
}
