//! Device edges of the pipeline: frame sources on the way in, synthetic input
//! sinks on the way out.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Instant,
};

use async_trait::async_trait;
use chrono::Utc;
use redglove_types::{
    frame::Frame, input::InputAction, telemetry::LatencySample, RedgloveError, Result,
};
use redglove_ops::push_bounded;
use tracing::info;

mod command;
mod enigo_sink;
mod images;
mod source;
mod xdotool;

pub use command::CommandSource;
pub use enigo_sink::{enigo_button, EnigoSink};
pub use images::ImageSequenceSource;
pub use source::{FrameSource, SyntheticSource};
pub use xdotool::{xdotool_args, XdotoolSink};

/// Aggregated sink performance counters.
#[derive(Debug, Default, Clone)]
pub struct SinkMetrics {
    pub last_latency: Option<LatencySample>,
    pub successful_inputs: u64,
    pub failed_inputs: u64,
}

impl SinkMetrics {
    pub(crate) fn record_success(&mut self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.last_latency = Some(LatencySample {
            injection_ms: elapsed,
            total_ms: elapsed,
            captured_at: Utc::now(),
        });
        self.successful_inputs += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_inputs += 1;
    }
}

/// Consumer of synthetic pointer events, e.g. the host display server.
#[async_trait]
pub trait InputSink: Send + Sync {
    async fn connect(&mut self) -> Result<()>;
    async fn inject_actions(&self, actions: Vec<InputAction>) -> Result<()>;
    fn metrics(&self) -> SinkMetrics;
}

#[async_trait]
impl<T: InputSink + ?Sized> InputSink for Box<T> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn inject_actions(&self, actions: Vec<InputAction>) -> Result<()> {
        (**self).inject_actions(actions).await
    }

    fn metrics(&self) -> SinkMetrics {
        (**self).metrics()
    }
}

pub const DEFAULT_RECORD_CAPACITY: usize = 256;

/// Sink that only logs and remembers the most recent actions it was asked to inject.
#[derive(Clone)]
pub struct LogSink {
    capacity: usize,
    recorded: Arc<Mutex<VecDeque<InputAction>>>,
    metrics: Arc<Mutex<SinkMetrics>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RECORD_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            recorded: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            metrics: Arc::new(Mutex::new(SinkMetrics::default())),
        }
    }

    /// The last `capacity` actions, oldest first.
    pub fn recorded(&self) -> Vec<InputAction> {
        self.recorded
            .lock()
            .map(|r| r.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSink for LogSink {
    async fn connect(&mut self) -> Result<()> {
        info!("Using log sink; no input reaches the display server");
        Ok(())
    }

    async fn inject_actions(&self, actions: Vec<InputAction>) -> Result<()> {
        ensure_actions_present(&actions)?;
        let start = Instant::now();
        for action in &actions {
            match action {
                InputAction::MoveTo { x, y } => tracing::debug!("Pointer move {} {}", x, y),
                InputAction::Button { button, pressed } => {
                    info!(
                        "Button {} {}",
                        button,
                        if *pressed { "down" } else { "up" }
                    )
                }
            }
        }
        {
            let mut recorded = self
                .recorded
                .lock()
                .map_err(|_| controller_error("failed to lock recorded actions"))?;
            for action in actions {
                push_bounded(&mut recorded, action, self.capacity);
            }
        }

        self.metrics
            .lock()
            .map_err(|_| controller_error("failed to lock metrics"))?
            .record_success(start);
        Ok(())
    }

    fn metrics(&self) -> SinkMetrics {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

/// Generate an error aligned with controller semantics.
pub fn controller_error(message: impl Into<String>) -> RedgloveError {
    RedgloveError::Controller(message.into())
}

pub fn capture_error(message: impl Into<String>) -> RedgloveError {
    RedgloveError::Capture(message.into())
}

/// Helper to ensure there is at least one action queued.
pub fn ensure_actions_present(actions: &[InputAction]) -> Result<()> {
    if actions.is_empty() {
        Err(controller_error("no input actions specified"))
    } else {
        Ok(())
    }
}

/// Frames handed out by a source must match the configured geometry.
pub(crate) fn check_dimensions(frame: &Frame, width: u32, height: u32) -> Result<()> {
    if frame.width != width || frame.height != height {
        return Err(capture_error(format!(
            "source produced {}x{} frame, expected {width}x{height}",
            frame.width, frame.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sink_records_in_order() {
        let mut sink = LogSink::new();
        sink.connect().await.expect("connect");
        sink.inject_actions(vec![
            InputAction::MoveTo { x: 10, y: 20 },
            InputAction::Button {
                button: 1,
                pressed: true,
            },
        ])
        .await
        .expect("inject");

        assert_eq!(
            sink.recorded(),
            vec![
                InputAction::MoveTo { x: 10, y: 20 },
                InputAction::Button {
                    button: 1,
                    pressed: true
                }
            ]
        );
        let metrics = sink.metrics();
        assert_eq!(metrics.successful_inputs, 1);
        assert!(metrics.last_latency.is_some());
    }

    #[tokio::test]
    async fn log_sink_keeps_only_the_most_recent_actions() {
        let sink = LogSink::with_capacity(4);
        for x in 0..10 {
            sink.inject_actions(vec![
                InputAction::MoveTo { x, y: 0 },
                InputAction::Button {
                    button: 1,
                    pressed: x % 2 == 0,
                },
            ])
            .await
            .expect("inject");
        }

        let recorded = sink.recorded();
        assert_eq!(recorded.len(), 4);
        assert_eq!(recorded[0], InputAction::MoveTo { x: 8, y: 0 });
        assert_eq!(
            recorded[3],
            InputAction::Button {
                button: 1,
                pressed: false
            }
        );
        assert_eq!(sink.metrics().successful_inputs, 10);
    }

    #[tokio::test]
    async fn empty_action_batch_is_rejected() {
        let sink: Box<dyn InputSink> = Box::new(LogSink::new());
        assert!(sink.inject_actions(Vec::new()).await.is_err());
    }

    #[test]
    fn dimension_check_flags_mismatch() {
        let frame = Frame::new(4, 4, redglove_types::frame::PixelLayout::Rgb);
        assert!(check_dimensions(&frame, 4, 4).is_ok());
        assert!(check_dimensions(&frame, 640, 480).is_err());
    }
}
