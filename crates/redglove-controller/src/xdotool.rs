use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Instant,
};

use async_trait::async_trait;
use redglove_types::{config::OutputConfig, input::InputAction, Result};
use tokio::process::Command;

use crate::{controller_error, ensure_actions_present, InputSink, SinkMetrics};

const DEFAULT_XDOTOOL: &str = "xdotool";

/// Injects pointer input into an X11 session through the XTEST-backed `xdotool`.
pub struct XdotoolSink {
    xdotool_path: PathBuf,
    metrics: Arc<Mutex<SinkMetrics>>,
}

impl XdotoolSink {
    pub fn new(config: &OutputConfig) -> Result<Self> {
        let xdotool_path = config
            .xdotool_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_XDOTOOL));

        Ok(Self {
            xdotool_path,
            metrics: Arc::new(Mutex::new(SinkMetrics::default())),
        })
    }

    async fn run_xdotool(&self, args: &[String]) -> Result<Vec<u8>> {
        let output = Command::new(&self.xdotool_path)
            .args(args)
            .output()
            .await
            .map_err(|err| {
                controller_error(format!("failed to run xdotool ({}): {err}", args.join(" ")))
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(controller_error(format!(
                "xdotool failed ({}): {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    fn record_success(&self, start: Instant) {
        if let Ok(mut guard) = self.metrics.lock() {
            guard.record_success(start);
        }
    }

    fn record_failure(&self) {
        if let Ok(mut guard) = self.metrics.lock() {
            guard.record_failure();
        }
    }
}

/// Chain every action of one frame into a single `xdotool` command line.
///
/// Negative coordinates are clamped to zero since `xdotool` would read them as flags.
pub fn xdotool_args(actions: &[InputAction]) -> Vec<String> {
    let mut args = Vec::with_capacity(actions.len() * 3);
    for action in actions {
        match *action {
            InputAction::MoveTo { x, y } => {
                args.push("mousemove".into());
                args.push(x.max(0).to_string());
                args.push(y.max(0).to_string());
            }
            InputAction::Button { button, pressed } => {
                args.push(if pressed { "mousedown" } else { "mouseup" }.into());
                args.push(button.to_string());
            }
        }
    }
    args
}

#[async_trait]
impl InputSink for XdotoolSink {
    async fn connect(&mut self) -> Result<()> {
        let version = self.run_xdotool(&["version".to_string()]).await?;
        tracing::info!(
            "xdotool sink ready: {}",
            String::from_utf8_lossy(&version).trim()
        );
        Ok(())
    }

    async fn inject_actions(&self, actions: Vec<InputAction>) -> Result<()> {
        ensure_actions_present(&actions)?;
        let start = Instant::now();
        match self.run_xdotool(&xdotool_args(&actions)).await {
            Ok(output) => {
                if !output.is_empty() {
                    tracing::debug!("xdotool output: {}", String::from_utf8_lossy(&output).trim());
                }
                self.record_success(start);
                Ok(())
            }
            Err(err) => {
                self.record_failure();
                Err(err)
            }
        }
    }

    fn metrics(&self) -> SinkMetrics {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }
}
