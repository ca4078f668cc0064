//! Multi-window rate limiting.

mod limiter;

pub use limiter::{
    Admission, RateLimiter, RateWindow, WindowLimit, GLOBAL_IDENTIFIER, SCOPE_GLOBAL, SCOPE_LEAD,
    SCOPE_OTP,
};
