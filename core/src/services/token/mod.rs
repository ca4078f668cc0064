//! JWT issuance and verification.

mod service;

pub use service::{IssuedTokens, TokenService};
