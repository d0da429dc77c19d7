use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

/// Provisional direction of bounding-box height change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShapeTrend {
    #[default]
    None,
    Shrinking,
    Growing,
}

/// Last emitted state of the synthetic mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ButtonState {
    #[default]
    Up,
    Down,
}

impl ButtonState {
    /// Numeric encoding used for the overlay thickness (`Up = 0`, `Down = 1`).
    pub fn as_index(self) -> i32 {
        match self {
            ButtonState::Up => 0,
            ButtonState::Down => 1,
        }
    }

    pub fn is_pressed(self) -> bool {
        self == ButtonState::Down
    }
}

/// Tracking memory carried from one frame to the next.
///
/// Owned by the frame loop and handed to each pipeline stage by `&mut`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackState {
    /// `None` means the target was not seen last frame.
    pub last_centroid: Option<Point>,
    pub last_box_height: u32,
    pub last_box_width: u32,
    pub shape_trend: ShapeTrend,
    pub button_state: ButtonState,
    /// Most recent detected box, kept while tracking is lost so the overlay stays put.
    pub last_box: Option<BoundingBox>,
}

impl TrackState {
    pub const DEFAULT_BOX_SIZE: u32 = 100;

    pub fn new(initial_box_width: u32, initial_box_height: u32) -> Self {
        Self {
            last_centroid: None,
            last_box_height: initial_box_height,
            last_box_width: initial_box_width,
            shape_trend: ShapeTrend::None,
            button_state: ButtonState::Up,
            last_box: None,
        }
    }
}

impl Default for TrackState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BOX_SIZE, Self::DEFAULT_BOX_SIZE)
    }
}

/// Outcome of scanning one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Integer mean of the target pixel coordinates.
    pub centroid: Point,
    /// Exact mean, `(x, y)`, used for sub-pixel pointer mapping.
    pub mean: (f64, f64),
    pub bbox: BoundingBox,
    pub pixel_count: u64,
}

/// Per-frame detection, `None` when no target pixel was found.
pub type Detection = Option<DetectionResult>;
