//! Middleware for HTTP request processing
//!
//! Layers run in this order on the way in: security headers, trace id, authentication,
//! global role checks, tenant context, tenant role checks. Body validation happens in the
//! [`validation::ValidatedJson`] extractor.

pub mod auth;
pub mod error;
pub mod security;
pub mod tenant;
pub mod trace_id;
pub mod validation;

// Re-export commonly used types
pub use auth::{require_auth, require_roles, AuthUser};
pub use error::{AppError, ErrorBody};
pub use security::{security_headers_middleware, SecurityConfig};
pub use tenant::{require_membership_roles, tenant_context, TenantContext};
pub use trace_id::{trace_id_middleware, TraceId};
pub use validation::ValidatedJson;
