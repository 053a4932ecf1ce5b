//! Command implementations.

pub mod cache;
pub mod render;
pub mod serve;
