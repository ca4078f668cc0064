//! Mock SMS delivery for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use sn_core::domain::entities::OtpPurpose;
use sn_core::services::otp::OtpDelivery;
use sn_shared::utils::mask_identifier;

use super::passcode_message;

/// Records every "sent" message instead of dispatching it.
///
/// Development servers log the code; tests read it back with
/// [`MockSmsDelivery::last_code`].
#[derive(Default)]
pub struct MockSmsDelivery {
    sent: Mutex<HashMap<String, String>>,
}

impl MockSmsDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last code delivered to an identifier.
    pub fn last_code(&self, identifier: &str) -> Option<String> {
        self.sent.lock().unwrap().get(identifier).cloned()
    }

    /// Number of messages delivered so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpDelivery for MockSmsDelivery {
    async fn send(
        &self,
        identifier: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), String> {
        info!(
            identifier = %mask_identifier(identifier),
            purpose = %purpose,
            message = %passcode_message(code, purpose),
            "Mock SMS delivery"
        );
        self.sent
            .lock()
            .unwrap()
            .insert(identifier.to_string(), code.to_string());
        Ok(())
    }
}
