//! Request and response bodies of the REST API.
//!
//! Field names are camelCase on the wire. Request types implement [`Validate`],
//! which the `ValidatedJson` extractor runs before a handler sees the body.

pub mod audit;
pub mod auth;
pub mod booking;
pub mod event;
pub mod media;
pub mod tenant;
pub mod user;
mod validation;

pub use audit::*;
pub use auth::*;
pub use booking::*;
pub use event::*;
pub use media::*;
pub use tenant::*;
pub use user::*;
pub use validation::{FieldErrors, Validate};

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::repositories::Page;

/// `?limit=&offset=` pagination parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, 1..=100 (default 20)
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        Page::new(query.limit, query.offset)
    }
}
