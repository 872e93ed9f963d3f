//! Public availability search

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
