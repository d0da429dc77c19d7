//! Converts detections into synthetic pointer input: frame-to-screen mapping and
//! the open/close hand gesture that drives the primary button.

pub mod pointer;
pub mod state_machine;

pub use pointer::PointerMapper;
pub use state_machine::{ButtonTransition, GestureStateMachine};
