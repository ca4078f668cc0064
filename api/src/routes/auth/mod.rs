//! Authentication routes.

pub mod change_password;
pub mod login;
pub mod logout;
pub mod otp_request;
pub mod otp_verify;
pub mod refresh;

pub use change_password::change_password;
pub use login::login;
pub use logout::logout;
pub use otp_request::otp_request;
pub use otp_verify::otp_verify;
pub use refresh::refresh;
