//! Payment endpoints: direct settle and hosted checkout

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
