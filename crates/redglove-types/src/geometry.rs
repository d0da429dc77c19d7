use serde::{Deserialize, Serialize};

/// Position in frame coordinates (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Absolute position on the host screen. May be negative near the frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open scan rectangle: `xmin <= x < xmax`, `ymin <= y < ymax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub xmin: u32,
    pub xmax: u32,
    pub ymin: u32,
    pub ymax: u32,
}

impl SearchWindow {
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            xmin: 0,
            xmax: width,
            ymin: 0,
            ymax: height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.xmin >= self.xmax || self.ymin >= self.ymax
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.xmin..self.xmax).contains(&point.x) && (self.ymin..self.ymax).contains(&point.y)
    }
}

/// Inclusive pixel bounds of a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl BoundingBox {
    /// Degenerate box covering a single pixel.
    pub const fn at(x: u32, y: u32) -> Self {
        Self {
            top: y,
            bottom: y,
            left: x,
            right: x,
        }
    }

    pub fn extend(&mut self, x: u32, y: u32) {
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y);
        self.left = self.left.min(x);
        self.right = self.right.max(x);
    }

    /// `bottom - top`, matching how the gesture history measures size.
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }
}
