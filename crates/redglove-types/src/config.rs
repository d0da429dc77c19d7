use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    input::{ButtonId, PRIMARY_BUTTON},
    RedgloveError, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Synthetic,
    Images,
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: SourceKind,
    pub width: u32,
    pub height: u32,
    /// Flip frames horizontally before tracking so motion feels like a mirror.
    pub mirror: bool,
    pub image_dir: Option<String>,
    /// Program and arguments writing raw bgr24 frames to stdout.
    pub command: Vec<String>,
    /// Pause before each synthetic or image frame; roughly 30 fps by default.
    pub frame_interval_ms: u64,
    /// Frames between open/close flips of the synthetic target.
    pub synthetic_gesture_period: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Synthetic,
            width: 640,
            height: 480,
            mirror: true,
            image_dir: None,
            command: Vec::new(),
            frame_interval_ms: 33,
            synthetic_gesture_period: 30,
        }
    }
}

/// Color rule and search neighbourhood. A pixel is target when
/// `red > red_min && green < green_max && blue < blue_max`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub search_radius: u32,
    pub red_min: u8,
    pub green_max: u8,
    pub blue_max: u8,
    pub highlight: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            search_radius: 100,
            red_min: 0x80,
            green_max: 0x20,
            blue_max: 0x20,
            highlight: true,
        }
    }
}

/// Affine map from normalized frame position to screen pixels:
/// `screen = norm * scale + offset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            scale_x: 1480.0,
            scale_y: 1000.0,
            offset_x: -100.0,
            offset_y: -100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Relative height change that counts as the hand opening or closing.
    pub change_factor: f64,
    pub initial_box_width: u32,
    pub initial_box_height: u32,
    pub button: ButtonId,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            change_factor: 0.75,
            initial_box_width: 100,
            initial_box_height: 100,
            button: PRIMARY_BUTTON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Log,
    Xdotool,
    Enigo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sink: SinkKind,
    pub xdotool_path: Option<String>,
    /// Directory for annotated PNG snapshots; disabled when unset.
    pub capture_dir: Option<String>,
    pub capture_every: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Log,
            xdotool_path: None,
            capture_dir: None,
            capture_every: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub log_level: String,
    /// Append logs here instead of stderr.
    pub log_file: Option<String>,
    pub event_buffer: usize,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_file: None,
            event_buffer: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_frames: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RedgloveConfig {
    pub capture: CaptureConfig,
    pub vision: VisionConfig,
    pub pointer: PointerConfig,
    pub gesture: GestureConfig,
    pub output: OutputConfig,
    pub ops: OpsConfig,
    pub orchestrator: OrchestratorConfig,
}

impl RedgloveConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            RedgloveError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            RedgloveError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(RedgloveError::Configuration(
                "capture.width and capture.height must be greater than zero".into(),
            ));
        }
        if self.capture.source == SourceKind::Images && self.capture.image_dir.is_none() {
            return Err(RedgloveError::Configuration(
                "capture.image_dir is required for the images source".into(),
            ));
        }
        if self.capture.source == SourceKind::Command && self.capture.command.is_empty() {
            return Err(RedgloveError::Configuration(
                "capture.command is required for the command source".into(),
            ));
        }
        if self.capture.synthetic_gesture_period == 0 {
            return Err(RedgloveError::Configuration(
                "capture.synthetic_gesture_period must be greater than zero".into(),
            ));
        }
        if self.vision.search_radius == 0 {
            return Err(RedgloveError::Configuration(
                "vision.search_radius must be greater than zero".into(),
            ));
        }
        if !(self.gesture.change_factor > 0.0 && self.gesture.change_factor < 1.0) {
            return Err(RedgloveError::Configuration(
                "gesture.change_factor must be between 0.0 and 1.0 (exclusive)".into(),
            ));
        }
        if self.output.capture_dir.is_some() && self.output.capture_every == 0 {
            return Err(RedgloveError::Configuration(
                "output.capture_every must be greater than zero".into(),
            ));
        }
        if self.ops.event_buffer == 0 {
            return Err(RedgloveError::Configuration(
                "ops.event_buffer must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
