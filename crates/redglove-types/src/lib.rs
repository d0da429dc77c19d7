//! Shared domain types for the redglove project.

pub mod config;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod telemetry;
pub mod tracking;

mod errors;

pub use errors::{RedgloveError, Result};
