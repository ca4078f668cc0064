//! SMS delivery of one-time passcodes.

pub mod mock;
pub mod twilio;

pub use mock::MockSmsDelivery;
pub use twilio::{TwilioConfig, TwilioSmsDelivery};

use sn_core::domain::entities::OtpPurpose;

/// Message body for a passcode, per purpose.
pub(crate) fn passcode_message(code: &str, purpose: OtpPurpose) -> String {
    let action = match purpose {
        OtpPurpose::Login => "sign in",
        OtpPurpose::ResetPassword => "reset your password",
        OtpPurpose::VerifyAccount => "verify your account",
        OtpPurpose::ChangePhone => "confirm your new phone number",
        OtpPurpose::ChangeEmail => "confirm your new email address",
    };
    format!(
        "Your Serena code to {} is {}. It expires in 5 minutes.",
        action, code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_carries_code_and_action() {
        let message = passcode_message("123456", OtpPurpose::Login);
        assert!(message.contains("123456"));
        assert!(message.contains("sign in"));

        let message = passcode_message("654321", OtpPurpose::ChangePhone);
        assert!(message.contains("654321"));
        assert!(message.contains("phone"));
    }
}
