use redglove_types::{
    config::VisionConfig,
    frame::Frame,
    geometry::SearchWindow,
    tracking::{Detection, TrackState},
};
use tracing::trace;

use crate::{
    region::select_search_window,
    resolve::resolve_target,
    segment::{segment, ColorThreshold},
};

/// Result of one detection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scan {
    pub window: SearchWindow,
    pub detection: Detection,
}

/// Region selection, segmentation and resolution wired together.
#[derive(Debug, Clone)]
pub struct ColorTracker {
    threshold: ColorThreshold,
    search_radius: u32,
    highlight: bool,
}

impl ColorTracker {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            threshold: ColorThreshold::from_config(config),
            search_radius: config.search_radius,
            highlight: config.highlight,
        }
    }

    pub fn scan(&self, frame: &mut Frame, state: &mut TrackState) -> Scan {
        let window = select_search_window(
            state.last_centroid,
            self.search_radius,
            frame.width,
            frame.height,
        );
        let seg = segment(frame, window, &self.threshold, self.highlight);
        let detection = resolve_target(&seg, state);
        trace!(?window, count = seg.count, "scanned search window");
        Scan { window, detection }
    }
}
