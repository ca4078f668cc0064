use actix_web::{web, HttpResponse};

use sn_core::store::ExpiringStore;

use crate::dto::auth::MessageResponse;
use crate::handlers::domain_error_response;
use crate::middleware::auth::AuthContext;
use crate::routes::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the access token that authenticated this request and its
/// paired refresh token. Terminal for the session: any later request
/// bearing either token is denied, even though their signatures and
/// expiry would still pass.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "message": "Logged out" }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: missing, invalid, or already-revoked token
/// - 503 Service Unavailable: revocation could not be recorded
pub async fn logout<K: ExpiringStore + 'static>(
    state: web::Data<AppState<K>>,
    auth: AuthContext,
) -> HttpResponse {
    match state.auth_service.logout(&auth.claims).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Logged out".to_string(),
        }),
        Err(error) => domain_error_response(&error),
    }
}
