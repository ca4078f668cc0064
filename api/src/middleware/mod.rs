//! Middleware pipeline pieces, composed in `app.rs` in a fixed order:
//! CORS → global request budget → tracing → routing, with JWT auth
//! wrapping only the protected routes.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{AuthContext, JwtAuth};
pub use cors::create_cors;
pub use rate_limit::RequestBudget;
