use redglove_types::{config::PointerConfig, geometry::ScreenPoint, tracking::DetectionResult};

/// Fixed affine map from frame space to screen space.
///
/// The defaults stretch a 640x480 camera image over a screen larger than the frame,
/// with a margin so the edges of the screen stay reachable.
#[derive(Debug, Clone)]
pub struct PointerMapper {
    config: PointerConfig,
}

impl PointerMapper {
    pub fn new(config: PointerConfig) -> Self {
        Self { config }
    }

    pub fn map(&self, detection: &DetectionResult, width: u32, height: u32) -> ScreenPoint {
        let norm_x = detection.mean.0 / f64::from(width.max(1));
        let norm_y = detection.mean.1 / f64::from(height.max(1));
        ScreenPoint::new(
            (norm_x * self.config.scale_x + self.config.offset_x) as i32,
            (norm_y * self.config.scale_y + self.config.offset_y) as i32,
        )
    }
}

impl Default for PointerMapper {
    fn default() -> Self {
        Self::new(PointerConfig::default())
    }
}
