use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::SearchWindow;

/// Timing and outcome of one processed frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameTelemetry {
    pub frame_index: u64,
    pub window: SearchWindow,
    pub pixel_count: u64,
    pub found: bool,
    pub actions: usize,
    pub processing_us: u64,
    pub injection_ms: u64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySample {
    pub injection_ms: u64,
    pub total_ms: u64,
    pub captured_at: DateTime<Utc>,
}

/// Totals accumulated over one run of the frame loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub found_frames: u64,
    pub lost_frames: u64,
    pub moves: u64,
    pub presses: u64,
    pub releases: u64,
}
