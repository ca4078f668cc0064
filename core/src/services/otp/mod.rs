//! One-time passcode manager.

mod service;

pub use service::{OtpDelivery, OtpService};
