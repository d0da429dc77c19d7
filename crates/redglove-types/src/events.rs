use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    geometry::{BoundingBox, Point, ScreenPoint},
    telemetry::{FrameTelemetry, RunStats},
    tracking::ButtonState,
};

/// High-level event kinds moving through the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lifecycle,
    Tracking,
    Gesture,
    Telemetry,
    Ops,
}

/// Immutable event envelope for logging and status views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Lifecycle(LifecycleEvent),
    Tracking(TrackingEvent),
    Gesture(GestureEvent),
    Telemetry(TelemetryEvent),
    Ops(OpsEvent),
    Unknown(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub phase: LifecyclePhase,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecyclePhase {
    Boot,
    Ready,
    StreamEnd,
    /// The loop was stopped from outside (Ctrl-C or the status view).
    Shutdown,
}

/// Target acquired or lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub frame_index: u64,
    pub centroid: Option<Point>,
    pub bbox: Option<BoundingBox>,
    pub screen: Option<ScreenPoint>,
}

/// Debounced button transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureEvent {
    pub frame_index: u64,
    pub state: ButtonState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Most recent per-frame sample, if any frame was processed.
    pub frame: Option<FrameTelemetry>,
    pub stats: Option<RunStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsEvent {
    pub message: String,
    pub tags: Vec<String>,
}

impl SystemEvent {
    pub fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn lifecycle(phase: LifecyclePhase, details: impl Into<String>) -> Self {
        Self::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent {
                phase,
                details: Some(details.into()),
            }),
        )
    }
}
