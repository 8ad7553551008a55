//! Data models

pub mod prediction;
pub mod feeds;

pub use prediction::*;
pub use feeds::*;
