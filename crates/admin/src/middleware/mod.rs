//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans with status and latency)
//! 3. Security headers (fixed strict CSP, HSTS)
//! 4. Session layer (tower-sessions, `admin.session` table)
//! 5. Rate limiting on login (governor)
//! 6. Role extractors in handlers

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminAuthRejection, RequireAdminAuth, RequireSuperAdmin, RequireWriteAccess,
    clear_current_admin, set_current_admin,
};
pub use rate_limit::login_rate_limiter;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
