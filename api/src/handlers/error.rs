//! Mapping from domain errors to HTTP responses.
//!
//! Client-input errors become 4xx with no retry semantics; store outages
//! on write paths surface as 503. Denials that double as security
//! signals (rate limits, OTP cooldowns) carry a `Retry-After` header.

use actix_web::http::header;
use actix_web::HttpResponse;

use sn_core::errors::{AuthError, DomainError, ErrorResponse, OtpError};

/// Render a domain error as an HTTP response.
pub fn domain_error_response(error: &DomainError) -> HttpResponse {
    let payload = ErrorResponse::from(error);

    match error {
        DomainError::Validation { .. } => HttpResponse::BadRequest().json(payload),

        DomainError::Auth(AuthError::InvalidIdentifierFormat { .. }) => {
            HttpResponse::BadRequest().json(payload)
        }
        DomainError::Auth(AuthError::InvalidCredentials) => {
            HttpResponse::Unauthorized().json(payload)
        }

        DomainError::Otp(otp) => match otp {
            // One response for "no challenge", "expired", and "wrong
            // code": the endpoint must not confirm whether a challenge
            // exists for an identifier
            OtpError::NotFound | OtpError::Expired | OtpError::CodeMismatch { .. } => {
                HttpResponse::Unauthorized().json(payload)
            }
            OtpError::TooManyAttempts => HttpResponse::TooManyRequests().json(payload),
            OtpError::CooldownActive {
                retry_after_seconds,
            } => HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
                .json(payload),
        },

        DomainError::Token(_) => HttpResponse::Unauthorized().json(payload),

        DomainError::RateLimit(limit) => HttpResponse::TooManyRequests()
            .insert_header((header::RETRY_AFTER, limit.retry_after_seconds.to_string()))
            .json(payload),

        DomainError::StoreUnavailable { .. } => HttpResponse::ServiceUnavailable().json(payload),

        DomainError::Internal { .. } => HttpResponse::InternalServerError().json(payload),
    }
}

/// Render request-body validation failures as a 400.
pub fn validation_error_response(errors: &validator::ValidationErrors) -> HttpResponse {
    let payload = ErrorResponse::new("VALIDATION_ERROR", "Invalid request data")
        .with_detail("validation_errors", serde_json::json!(errors));
    HttpResponse::BadRequest().json(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use sn_core::errors::{RateLimitExceeded, TokenError};

    #[test]
    fn test_otp_failures_share_status_and_code() {
        let statuses: Vec<StatusCode> = [
            DomainError::Otp(OtpError::NotFound),
            DomainError::Otp(OtpError::Expired),
            DomainError::Otp(OtpError::CodeMismatch {
                remaining_attempts: 1,
            }),
        ]
        .iter()
        .map(|e| domain_error_response(e).status())
        .collect();

        assert!(statuses.iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_rate_limit_carries_retry_after() {
        let error = DomainError::RateLimit(RateLimitExceeded {
            scope: "lead".to_string(),
            window: "hourly".to_string(),
            retry_after_seconds: 900,
        });
        let response = domain_error_response(&error);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "900"
        );
    }

    #[test]
    fn test_status_map() {
        let cases = [
            (
                DomainError::Auth(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                DomainError::Otp(OtpError::TooManyAttempts),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                DomainError::Token(TokenError::Revoked),
                StatusCode::UNAUTHORIZED,
            ),
            (
                DomainError::StoreUnavailable {
                    message: "down".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DomainError::Internal {
                    message: "bug".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(domain_error_response(&error).status(), expected);
        }
    }
}
