//! Frame loop coordinating the frame source, the detection pipeline and the input sink.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc,
    },
    time::Instant,
};

use async_trait::async_trait;
use redglove_controller::{FrameSource, InputSink};
use redglove_gesture::ButtonTransition;
use redglove_ops::{ensure_capture_dir, TelemetryStore};
use redglove_types::{
    config::{OrchestratorConfig, RedgloveConfig},
    events::{
        EventKind, EventPayload, GestureEvent, LifecyclePhase, OpsEvent, SystemEvent,
        TelemetryEvent, TrackingEvent,
    },
    frame::Frame,
    telemetry::{FrameTelemetry, RunStats},
    tracking::TrackState,
    RedgloveError, Result,
};
use redglove_vision::SnapshotWriter;
use tracing::{debug, error, info, warn};

mod pipeline;

pub use pipeline::{FrameOutcome, FramePipeline};

/// Everything known about one processed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub outcome: FrameOutcome,
    pub telemetry: FrameTelemetry,
    /// The frame after highlighting and overlay.
    pub frame: Frame,
}

pub struct Orchestrator<S, I>
where
    S: FrameSource,
    I: InputSink,
{
    source: S,
    sink: I,
    pipeline: FramePipeline,
    state: TrackState,
    snapshots: SnapshotWriter,
    telemetry: TelemetryStore,
    observer: Option<mpsc::Sender<SystemEvent>>,
    shutdown: Arc<AtomicBool>,
    config: OrchestratorConfig,
    stats: RunStats,
    frame_index: u64,
}

impl<S, I> Orchestrator<S, I>
where
    S: FrameSource,
    I: InputSink,
{
    pub fn new(config: &RedgloveConfig, source: S, sink: I, telemetry: TelemetryStore) -> Self {
        Self {
            source,
            sink,
            pipeline: FramePipeline::new(config),
            state: FramePipeline::initial_state(config),
            snapshots: SnapshotWriter::new(&config.output),
            telemetry,
            observer: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            config: config.orchestrator.clone(),
            stats: RunStats::default(),
            frame_index: 0,
        }
    }

    /// Forward every published event to `observer` as well as the telemetry store.
    pub fn with_observer(mut self, observer: mpsc::Sender<SystemEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Flag that stops the loop before the next frame is requested.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn sink(&self) -> &I {
        &self.sink
    }

    pub async fn boot(&mut self, full_config: &RedgloveConfig) -> Result<()> {
        if let Some(dir) = &full_config.output.capture_dir {
            ensure_capture_dir(dir)?;
        }

        self.source.open().await?;
        self.sink.connect().await?;

        self.publish(SystemEvent::lifecycle(
            LifecyclePhase::Boot,
            format!(
                "tracking {}x{} frames, search radius {}",
                full_config.capture.width,
                full_config.capture.height,
                full_config.vision.search_radius
            ),
        ))
        .await?;
        Ok(())
    }

    /// Detect, map, debounce, then hand the resulting input to the sink.
    pub async fn process_frame(&mut self, mut frame: Frame) -> Result<FrameReport> {
        let index = self.frame_index;
        self.frame_index += 1;
        let was_tracking = self.state.last_centroid.is_some();

        let start = Instant::now();
        let outcome = self.pipeline.process(&mut frame, &mut self.state);
        self.pipeline.annotate(&mut frame, &self.state);
        let processing_us = start.elapsed().as_micros() as u64;

        let inject_start = Instant::now();
        if !outcome.actions.is_empty() {
            self.sink.inject_actions(outcome.actions.clone()).await?;
        }
        let injection_ms = inject_start.elapsed().as_millis() as u64;

        if self.snapshots.is_due(index) {
            self.save_snapshot(index, frame.clone()).await?;
        }

        self.stats.frames += 1;
        match &outcome.scan.detection {
            Some(_) => {
                self.stats.found_frames += 1;
                self.stats.moves += 1;
            }
            None => self.stats.lost_frames += 1,
        }
        match outcome.transition {
            Some(ButtonTransition::Press) => self.stats.presses += 1,
            Some(ButtonTransition::Release) => self.stats.releases += 1,
            None => {}
        }

        let found = outcome.scan.detection.is_some();
        if found != was_tracking {
            let detection = outcome.scan.detection;
            if found {
                info!("Target acquired at frame {}", index);
            } else {
                info!("Target lost at frame {}", index);
            }
            self.publish(SystemEvent::new(
                EventKind::Tracking,
                EventPayload::Tracking(TrackingEvent {
                    frame_index: index,
                    centroid: detection.map(|d| d.centroid),
                    bbox: detection.map(|d| d.bbox),
                    screen: outcome.screen,
                }),
            ))
            .await?;
        }
        if outcome.transition.is_some() {
            self.publish(SystemEvent::new(
                EventKind::Gesture,
                EventPayload::Gesture(GestureEvent {
                    frame_index: index,
                    state: self.state.button_state,
                }),
            ))
            .await?;
        }

        let telemetry = FrameTelemetry {
            frame_index: index,
            window: outcome.scan.window,
            pixel_count: outcome.scan.detection.map_or(0, |d| d.pixel_count),
            found,
            actions: outcome.actions.len(),
            processing_us,
            injection_ms,
            captured_at: frame.captured_at,
        };
        debug!(
            frame = index,
            found,
            pixels = telemetry.pixel_count,
            processing_us,
            "frame processed"
        );
        self.telemetry.record_frame(telemetry.clone()).await?;

        Ok(FrameReport {
            outcome,
            telemetry,
            frame,
        })
    }

    /// PNG encoding runs on the blocking pool. A failed write is only logged.
    async fn save_snapshot(&mut self, index: u64, annotated: Frame) -> Result<()> {
        let writer = self.snapshots.clone();
        let saved = tokio::task::spawn_blocking(move || writer.persist(index, &annotated))
            .await
            .map_err(|err| orchestrator_error(format!("snapshot task failed: {err}")))
            .and_then(|result| result);

        match saved {
            Ok(Some(path)) => {
                self.publish(SystemEvent::new(
                    EventKind::Ops,
                    EventPayload::Ops(OpsEvent {
                        message: format!("snapshot saved to {}", path.display()),
                        tags: vec!["snapshot".into(), format!("frame-{index}")],
                    }),
                ))
                .await
            }
            Ok(None) => Ok(()),
            Err(err) => {
                warn!("Snapshot for frame {} failed: {}", index, err);
                Ok(())
            }
        }
    }

    async fn publish(&mut self, event: SystemEvent) -> Result<()> {
        if let Some(observer) = &self.observer {
            // The observer going away must not stop tracking.
            let _ = observer.send(event.clone());
        }
        self.telemetry.record_event(event).await
    }

    fn frame_limit_reached(&self) -> bool {
        self.config
            .max_frames
            .is_some_and(|limit| self.stats.frames >= limit)
    }
}

#[async_trait]
pub trait TrackingRunner {
    async fn run(&mut self) -> Result<RunStats>;
}

#[async_trait]
impl<S, I> TrackingRunner for Orchestrator<S, I>
where
    S: FrameSource,
    I: InputSink,
{
    async fn run(&mut self) -> Result<RunStats> {
        self.publish(SystemEvent::lifecycle(
            LifecyclePhase::Ready,
            "frame loop started",
        ))
        .await?;

        let (phase, reason) = loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break (LifecyclePhase::Shutdown, "stop requested".to_string());
            }
            if self.frame_limit_reached() {
                break (
                    LifecyclePhase::StreamEnd,
                    format!("frame limit of {} reached", self.stats.frames),
                );
            }
            match self.source.next_frame().await {
                Ok(Some(frame)) => {
                    self.process_frame(frame).await?;
                }
                Ok(None) => break (LifecyclePhase::StreamEnd, "end of stream".to_string()),
                Err(err) => {
                    error!("Frame acquisition failed: {}", err);
                    break (LifecyclePhase::StreamEnd, format!("capture failed: {err}"));
                }
            }
        };

        info!(
            "Frame loop finished ({}): {} frames, {} presses, {} releases",
            reason, self.stats.frames, self.stats.presses, self.stats.releases
        );
        let recent = self.telemetry.snapshot_frames().await;
        if !recent.is_empty() {
            let total_us: u64 = recent.iter().map(|t| t.processing_us).sum();
            info!(
                "Mean processing time over the last {} frames: {} us",
                recent.len(),
                total_us / recent.len() as u64
            );
        }
        self.publish(SystemEvent::lifecycle(phase, reason)).await?;
        self.publish(SystemEvent::new(
            EventKind::Telemetry,
            EventPayload::Telemetry(TelemetryEvent {
                frame: recent.last().cloned(),
                stats: Some(self.stats),
            }),
        ))
        .await?;
        Ok(self.stats)
    }
}

pub fn orchestrator_error(message: impl Into<String>) -> RedgloveError {
    RedgloveError::Orchestrator(message.into())
}
