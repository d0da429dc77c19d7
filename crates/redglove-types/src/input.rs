use serde::{Deserialize, Serialize};

/// X11 style button number; `1` is the primary button.
pub type ButtonId = u8;

pub const PRIMARY_BUTTON: ButtonId = 1;

/// Synthetic input primitives handed to an input sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    /// Absolute pointer motion in screen coordinates.
    MoveTo { x: i32, y: i32 },
    Button { button: ButtonId, pressed: bool },
}
