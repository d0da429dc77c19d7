//! Red target detection: region selection, color segmentation, target resolution,
//! overlay drawing and snapshot persistence.

pub mod overlay;
pub mod region;
pub mod resolve;
pub mod segment;
pub mod snapshot;

mod tracker;

use redglove_types::RedgloveError;

pub use overlay::{draw_box, overlay_thickness};
pub use region::select_search_window;
pub use resolve::resolve_target;
pub use segment::{segment, ColorThreshold, Segmentation};
pub use snapshot::SnapshotWriter;
pub use tracker::{ColorTracker, Scan};

pub fn vision_error(message: impl Into<String>) -> RedgloveError {
    RedgloveError::Vision(message.into())
}
