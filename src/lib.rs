#![deny(clippy::all)]
#![deny(clippy::pedantic)]
// Allow some overly strict pedantic lints
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]

//! UAE Trails API
//!
//! Multi-tenant REST backend for outdoor event organizers: tenants publish events,
//! participants book places, platform admins manage tenants and users. Every
//! privileged mutation is recorded in an audit log.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use infrastructure::config::AppConfig;
pub use infrastructure::http::{build_state, create_app, start_server};
pub use presentation::{AppState, Repositories};
