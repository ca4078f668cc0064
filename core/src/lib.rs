//! # Serena Core
//!
//! Trust and abuse-prevention core for the Serena backend: the OTP login
//! protocol, JWT issuance and revocation, and multi-window rate limiting.
//! All transient security state lives in an external expiring key-value
//! store; this crate defines the store abstraction and the services on top
//! of it, but no concrete storage or HTTP.

pub mod domain;
pub mod errors;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
pub use store::{ExpiringStore, StoreError};
