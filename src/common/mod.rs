//! Common types, traits and utilities shared across the crate

pub mod display;
pub mod errors;
pub mod traits;
pub mod types;
