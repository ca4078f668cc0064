//! Twilio SMS delivery.
//!
//! Sends passcodes through the Twilio Messages API over plain HTTPS with
//! basic auth. Delivery is fire-and-forget from the OTP manager's point
//! of view: errors returned here are logged by the caller, never
//! surfaced to the client.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::time::Duration;
use tracing::{debug, warn};

use sn_core::domain::entities::OtpPurpose;
use sn_core::services::otp::OtpDelivery;
use sn_shared::utils::mask_identifier;

use super::passcode_message;
use crate::InfraError;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio account configuration.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// Sender number (must be a Twilio number, E.164)
    pub from_number: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl TwilioConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, InfraError> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| InfraError::Config("TWILIO_ACCOUNT_SID not set".to_string()))?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| InfraError::Config("TWILIO_AUTH_TOKEN not set".to_string()))?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER")
            .map_err(|_| InfraError::Config("TWILIO_FROM_NUMBER not set".to_string()))?;

        if !from_number.starts_with('+') {
            return Err(InfraError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            request_timeout_secs: std::env::var("TWILIO_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}

/// Twilio-backed passcode delivery.
pub struct TwilioSmsDelivery {
    client: reqwest::Client,
    config: TwilioConfig,
    authorization: String,
}

impl TwilioSmsDelivery {
    pub fn new(config: TwilioConfig) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| InfraError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let authorization = format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", config.account_sid, config.auth_token))
        );

        Ok(Self {
            client,
            config,
            authorization,
        })
    }

    pub fn from_env() -> Result<Self, InfraError> {
        Self::new(TwilioConfig::from_env()?)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.config.account_sid
        )
    }
}

#[async_trait]
impl OtpDelivery for TwilioSmsDelivery {
    async fn send(
        &self,
        identifier: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), String> {
        let body = passcode_message(code, purpose);
        let params = [
            ("To", identifier),
            ("From", self.config.from_number.as_str()),
            ("Body", body.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .header("Authorization", &self.authorization)
            .form(&params)
            .send()
            .await
            .map_err(|e| format!("Twilio request failed: {}", e))?;

        let status = response.status();
        if status.is_success() {
            debug!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                "Twilio accepted message"
            );
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            warn!(
                identifier = %mask_identifier(identifier),
                status = %status,
                "Twilio rejected message"
            );
            Err(format!("Twilio returned {}: {}", status, detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC00000000000000000000000000000000".to_string(),
            auth_token: "secret".to_string(),
            from_number: "+15005550006".to_string(),
            request_timeout_secs: 10,
        }
    }

    #[test]
    fn test_messages_url_shape() {
        let delivery = TwilioSmsDelivery::new(config()).unwrap();
        assert_eq!(
            delivery.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC00000000000000000000000000000000/Messages.json"
        );
    }

    #[test]
    fn test_authorization_is_basic_auth() {
        let delivery = TwilioSmsDelivery::new(config()).unwrap();
        assert!(delivery.authorization.starts_with("Basic "));
        let encoded = delivery.authorization.trim_start_matches("Basic ");
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "AC00000000000000000000000000000000:secret"
        );
    }

    #[test]
    fn test_from_number_must_be_e164() {
        std::env::set_var("TWILIO_ACCOUNT_SID", "AC0");
        std::env::set_var("TWILIO_AUTH_TOKEN", "t");
        std::env::set_var("TWILIO_FROM_NUMBER", "15005550006");
        assert!(TwilioConfig::from_env().is_err());
        std::env::remove_var("TWILIO_ACCOUNT_SID");
        std::env::remove_var("TWILIO_AUTH_TOKEN");
        std::env::remove_var("TWILIO_FROM_NUMBER");
    }
}
