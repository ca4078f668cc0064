//! Domain entities.

pub mod otp_challenge;
pub mod principal;
pub mod token;

pub use otp_challenge::{OtpChallenge, OtpPurpose, CODE_LENGTH};
pub use principal::{Principal, Role};
pub use token::{Claims, SessionRecord, TokenPair, TokenUse, TOKEN_TYPE_BEARER};
