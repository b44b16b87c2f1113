pub mod audit_log;
pub mod booking;
pub mod event;
pub mod ids;
pub mod tenant;
pub mod user;

pub use audit_log::*;
pub use booking::*;
pub use event::*;
pub use ids::*;
pub use tenant::*;
pub use user::*;
