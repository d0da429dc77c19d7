use std::{
    sync::{Arc, Mutex},
    thread,
    time::Instant,
};

use async_trait::async_trait;
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use redglove_types::{
    input::{ButtonId, InputAction},
    Result,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::{controller_error, ensure_actions_present, InputSink, SinkMetrics};

type Batch = (Vec<InputAction>, oneshot::Sender<Result<()>>);

/// Injects pointer input in-process through `enigo`.
///
/// The display connection lives on its own thread for the whole run, so a frame
/// costs one channel round trip instead of a process spawn.
#[derive(Default)]
pub struct EnigoSink {
    batches: Option<mpsc::UnboundedSender<Batch>>,
    metrics: Arc<Mutex<SinkMetrics>>,
}

impl EnigoSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, start: Instant, ok: bool) {
        if let Ok(mut guard) = self.metrics.lock() {
            if ok {
                guard.record_success(start);
            } else {
                guard.record_failure();
            }
        }
    }
}

/// X11 button numbering: 1 left, 2 middle, 3 right.
pub fn enigo_button(button: ButtonId) -> Result<Button> {
    match button {
        1 => Ok(Button::Left),
        2 => Ok(Button::Middle),
        3 => Ok(Button::Right),
        other => Err(controller_error(format!("unsupported button {other}"))),
    }
}

fn apply(enigo: &mut Enigo, actions: &[InputAction]) -> Result<()> {
    for action in actions {
        match *action {
            InputAction::MoveTo { x, y } => enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|err| controller_error(format!("pointer move failed: {err}")))?,
            InputAction::Button { button, pressed } => {
                let direction = if pressed {
                    Direction::Press
                } else {
                    Direction::Release
                };
                enigo
                    .button(enigo_button(button)?, direction)
                    .map_err(|err| controller_error(format!("button {button} failed: {err}")))?;
            }
        }
    }
    Ok(())
}

fn serve(mut enigo: Enigo, mut batches: mpsc::UnboundedReceiver<Batch>) {
    while let Some((actions, reply)) = batches.blocking_recv() {
        let _ = reply.send(apply(&mut enigo, &actions));
    }
    debug!("enigo worker stopped");
}

#[async_trait]
impl InputSink for EnigoSink {
    async fn connect(&mut self) -> Result<()> {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        thread::Builder::new()
            .name("redglove-enigo".into())
            .spawn(move || match Enigo::new(&Settings::default()) {
                Ok(enigo) => {
                    let _ = ready_tx.send(Ok(()));
                    serve(enigo, batch_rx);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(controller_error(format!(
                        "failed to connect to the display: {err}"
                    ))));
                }
            })
            .map_err(|err| controller_error(format!("failed to start enigo worker: {err}")))?;

        ready_rx
            .await
            .map_err(|_| controller_error("enigo worker exited during startup"))??;
        self.batches = Some(batch_tx);
        info!("enigo sink ready");
        Ok(())
    }

    async fn inject_actions(&self, actions: Vec<InputAction>) -> Result<()> {
        ensure_actions_present(&actions)?;
        let batches = self
            .batches
            .as_ref()
            .ok_or_else(|| controller_error("enigo sink is not connected"))?;

        let start = Instant::now();
        let (reply_tx, reply_rx) = oneshot::channel();
        let outcome = match batches.send((actions, reply_tx)) {
            Ok(()) => reply_rx
                .await
                .unwrap_or_else(|_| Err(controller_error("enigo worker stopped"))),
            Err(_) => Err(controller_error("enigo worker stopped")),
        };
        self.record(start, outcome.is_ok());
        outcome
    }

    fn metrics(&self) -> SinkMetrics {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }
}
