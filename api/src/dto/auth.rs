//! Auth endpoint request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use sn_core::domain::value_objects::{AuthResponse, OtpTicket};

/// Request body for POST /api/v1/auth/login and /api/v1/auth/otp/request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login identifier (mobile number)
    #[validate(length(min = 8, max = 16, message = "Invalid identifier length"))]
    pub username: String,

    /// Account password
    #[validate(length(min = 8, max = 128, message = "Invalid password length"))]
    pub password: String,
}

/// Request body for POST /api/v1/auth/otp/verify
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OtpVerifyRequest {
    #[validate(length(min = 8, max = 16, message = "Invalid identifier length"))]
    pub username: String,

    /// The 6-digit code from the delivery channel
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub otp_code: String,
}

/// Request body for POST /api/v1/auth/refresh
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token required"))]
    pub refresh_token: String,
}

/// Request body for POST /api/v1/auth/change-password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 8, max = 128, message = "Invalid password length"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "New password must be 8-128 characters"))]
    pub new_password: String,
}

/// Token payload returned by login, OTP verification, and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user_info: UserInfoDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoDto {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl From<AuthResponse> for TokenResponse {
    fn from(response: AuthResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            expires_at: response.expires_at,
            user_info: UserInfoDto {
                id: response.user.id,
                username: response.user.username,
                role: response.user.role.as_str().to_string(),
            },
        }
    }
}

/// Acknowledgement returned by POST /api/v1/auth/otp/request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpTicketResponse {
    /// Masked identifier the code went to
    pub identifier: String,
    pub expires_at: DateTime<Utc>,
    pub next_request_at: DateTime<Utc>,
}

impl From<OtpTicket> for OtpTicketResponse {
    fn from(ticket: OtpTicket) -> Self {
        Self {
            identifier: ticket.identifier,
            expires_at: ticket.expires_at,
            next_request_at: ticket.next_request_at,
        }
    }
}

/// Response for POST /api/v1/auth/logout and /api/v1/auth/change-password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            username: "0901234567".to_string(),
            password: "secret-password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_password = LoginRequest {
            username: "0901234567".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_otp_verify_code_length() {
        let base = OtpVerifyRequest {
            username: "0901234567".to_string(),
            otp_code: "123456".to_string(),
        };
        assert!(base.validate().is_ok());

        for bad in ["12345", "1234567", ""] {
            let request = OtpVerifyRequest {
                otp_code: bad.to_string(),
                ..base.clone()
            };
            assert!(request.validate().is_err());
        }
    }
}
