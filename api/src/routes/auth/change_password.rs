use actix_web::{web, HttpResponse};
use validator::Validate;

use sn_core::store::ExpiringStore;

use crate::dto::auth::{ChangePasswordRequest, MessageResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::middleware::auth::AuthContext;
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/change-password
///
/// Changes the password after re-verifying the current one, then revokes
/// every outstanding session for the account — tokens issued on other
/// devices before the change stop working immediately.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Request Body
///
/// ```json
/// {
///     "current_password": "********",
///     "new_password": "********"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "message": "Password changed; all sessions signed out" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: malformed body
/// - 401 Unauthorized: bad bearer token or wrong current password
/// - 503 Service Unavailable: session revocation could not be recorded
pub async fn change_password<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    auth: AuthContext,
    request: web::Json<ChangePasswordRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    match state
        .auth_service
        .change_password(
            &auth.claims,
            &request.current_password,
            &request.new_password,
        )
        .await
    {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Password changed; all sessions signed out".to_string(),
        }),
        Err(error) => domain_error_response(&error),
    }
}
