pub mod email;
pub mod roles;
pub mod status;

pub use email::*;
pub use roles::*;
pub use status::*;
