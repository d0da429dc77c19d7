use std::path::PathBuf;

use chrono::Utc;
use image::RgbImage;
use redglove_types::{config::OutputConfig, frame::Frame, Result};
use tracing::debug;

use crate::vision_error;

/// Writes every Nth annotated frame as a PNG.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    capture_dir: Option<PathBuf>,
    every: u64,
}

impl SnapshotWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            capture_dir: config.capture_dir.as_ref().map(PathBuf::from),
            every: u64::from(config.capture_every.max(1)),
        }
    }

    /// Whether `persist` would write this frame.
    pub fn is_due(&self, frame_index: u64) -> bool {
        self.capture_dir.is_some() && frame_index % self.every == 0
    }

    /// Encode and write the frame if it is due. The capture directory must
    /// already exist; it is created once at boot.
    pub fn persist(&self, frame_index: u64, frame: &Frame) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.capture_dir else {
            return Ok(None);
        };
        if !self.is_due(frame_index) {
            return Ok(None);
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let path = dir.join(format!("frame_{frame_index:06}_{timestamp}.png"));
        let Some(buffer) = RgbImage::from_raw(frame.width, frame.height, frame.to_rgb_bytes())
        else {
            return Err(vision_error("frame buffer does not match its dimensions"));
        };
        buffer
            .save(&path)
            .map_err(|err| vision_error(format!("failed to save snapshot: {err}")))?;
        debug!("saved snapshot {}", path.display());
        Ok(Some(path))
    }
}
