use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use sn_core::services::rate_limit::SCOPE_LEAD;
use sn_core::store::ExpiringStore;
use sn_shared::utils::mask_identifier;

use crate::dto::lead::{CreateLeadRequest, LeadAcceptedResponse};
use crate::handlers::{domain_error_response, validation_error_response};
use crate::routes::AppState;

/// Handler for POST /api/v1/leads
///
/// Public, unauthenticated lead intake from the booking widget. Every
/// submission passes rate-limit admission keyed by client IP — hourly
/// and daily windows must both agree — before the lead is acknowledged.
///
/// # Request Body
///
/// ```json
/// {
///     "name": "Lan Pham",
///     "phone": "0901234567",
///     "note": "Interested in a facial treatment package"
/// }
/// ```
///
/// # Response
///
/// ## Success (202 Accepted)
/// ```json
/// { "reference": "7c9e6679-...", "message": "Lead received" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: malformed body
/// - 429 Too Many Requests: hourly or daily window exhausted; the
///   `Retry-After` header and `window` detail say which
pub async fn create_lead<K: ExpiringStore + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<K>>,
    request: web::Json<CreateLeadRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return validation_error_response(&errors);
    }

    let client_ip = client_ip(&req);
    if let Err(error) = state
        .rate_limiter
        .admit(SCOPE_LEAD, &client_ip)
        .await
        .into_result(SCOPE_LEAD)
    {
        return domain_error_response(&error);
    }

    // Admission granted: acknowledge. CRM-side lead processing is owned
    // by the business modules, not this core.
    let reference = Uuid::new_v4();
    info!(
        reference = %reference,
        phone = %mask_identifier(&request.phone),
        client_ip = %client_ip,
        "Lead accepted"
    );

    HttpResponse::Accepted().json(LeadAcceptedResponse {
        reference,
        message: "Lead received".to_string(),
    })
}

/// Client IP for rate-limit keying: the reverse proxy's forwarded
/// address when present, the peer address otherwise.
fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
