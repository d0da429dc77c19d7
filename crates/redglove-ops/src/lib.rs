//! Operational helpers: logging setup and in-memory telemetry.

use std::{collections::VecDeque, fs::OpenOptions, path::PathBuf, sync::Arc};

use redglove_types::{
    config::OpsConfig, events::SystemEvent, telemetry::FrameTelemetry, RedgloveError, Result,
};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| RedgloveError::Ops(format!("failed to create log filter: {err}")))?;

    let builder = fmt().with_env_filter(filter);
    let result = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| RedgloveError::Ops(format!("failed to open log file {path}: {err}")))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|err| RedgloveError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

/// Bounded in-memory store of recent events and per-frame telemetry.
#[derive(Clone)]
pub struct TelemetryStore {
    capacity: usize,
    events: Arc<Mutex<VecDeque<SystemEvent>>>,
    frames: Arc<Mutex<VecDeque<FrameTelemetry>>>,
}

impl TelemetryStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            frames: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    pub async fn record_event(&self, event: SystemEvent) -> Result<()> {
        push_bounded(&mut *self.events.lock().await, event, self.capacity);
        Ok(())
    }

    pub async fn record_frame(&self, telemetry: FrameTelemetry) -> Result<()> {
        push_bounded(&mut *self.frames.lock().await, telemetry, self.capacity);
        Ok(())
    }

    pub async fn snapshot_events(&self) -> Vec<SystemEvent> {
        self.events.lock().await.iter().cloned().collect()
    }

    pub async fn snapshot_frames(&self) -> Vec<FrameTelemetry> {
        self.frames.lock().await.iter().cloned().collect()
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new(OpsConfig::default().event_buffer)
    }
}

/// Append `item`, dropping the oldest entry once `capacity` is reached.
pub fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, capacity: usize) {
    if queue.len() == capacity {
        queue.pop_front();
    }
    queue.push_back(item);
}

pub fn ensure_capture_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    std::fs::create_dir_all(&dir)
        .map_err(|err| RedgloveError::Ops(format!("failed to create capture dir: {err}")))?;
    info!("Capture directory ready at {:?}", dir);
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redglove_types::events::LifecyclePhase;

    #[tokio::test]
    async fn store_keeps_most_recent_events() {
        let store = TelemetryStore::new(2);
        store
            .record_event(SystemEvent::lifecycle(LifecyclePhase::Boot, "one"))
            .await
            .expect("record");
        store
            .record_event(SystemEvent::lifecycle(LifecyclePhase::Ready, "two"))
            .await
            .expect("record");
        store
            .record_event(SystemEvent::lifecycle(LifecyclePhase::Shutdown, "three"))
            .await
            .expect("record");

        let events = store.snapshot_events().await;
        assert_eq!(events.len(), 2);
        let phases: Vec<_> = events
            .iter()
            .filter_map(|e| match &e.payload {
                redglove_types::events::EventPayload::Lifecycle(l) => Some(l.phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![LifecyclePhase::Ready, LifecyclePhase::Shutdown]);
    }

    #[test]
    fn push_bounded_drops_oldest() {
        let mut queue = VecDeque::new();
        for value in 0..5 {
            push_bounded(&mut queue, value, 3);
        }
        assert_eq!(queue, VecDeque::from(vec![2, 3, 4]));
    }

    #[test]
    fn capture_dir_is_created() {
        let dir = std::env::temp_dir().join(format!("redglove-ops-{}", std::process::id()));
        let created = ensure_capture_dir(&dir.to_string_lossy()).expect("create");
        assert!(created.is_dir());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
