use std::process::Stdio;

use async_trait::async_trait;
use redglove_types::{
    config::CaptureConfig,
    frame::{Frame, PixelLayout},
    Result,
};
use tokio::{
    io::AsyncReadExt,
    process::{Child, ChildStdout, Command},
};
use tracing::{info, warn};

use crate::{capture_error, FrameSource};

/// Reads raw bgr24 frames from the stdout of a capture process, for example
/// `ffmpeg -f v4l2 -video_size 640x480 -i /dev/video0 -f rawvideo -pix_fmt bgr24 -`.
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    width: u32,
    height: u32,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl CommandSource {
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| capture_error("command source needs capture.command"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            width: config.width,
            height: config.height,
            child: None,
            stdout: None,
        })
    }
}

#[async_trait]
impl FrameSource for CommandSource {
    async fn open(&mut self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| capture_error(format!("failed to spawn {}: {err}", self.program)))?;
        self.stdout = child.stdout.take();
        self.child = Some(child);
        info!(
            "Capture process {} started for {}x{} bgr24 frames",
            self.program, self.width, self.height
        );
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let stdout = self
            .stdout
            .as_mut()
            .ok_or_else(|| capture_error("capture process not started"))?;
        let mut buf = vec![0u8; Frame::byte_len(self.width, self.height)];
        match stdout.read_exact(&mut buf).await {
            Ok(_) => Frame::from_raw(self.width, self.height, PixelLayout::Bgr, buf).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                if let Some(child) = self.child.as_mut() {
                    match child.try_wait() {
                        Ok(Some(status)) => info!("Capture process exited: {status}"),
                        Ok(None) => warn!("Capture process closed stdout but is still running"),
                        Err(err) => warn!("Capture process status unavailable: {err}"),
                    }
                }
                Ok(None)
            }
            Err(err) => Err(capture_error(format!("failed to read frame: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_command() {
        assert!(CommandSource::new(&CaptureConfig::default()).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_raw_frames_until_eof() {
        // 2x1 frame = 6 bytes; print two frames worth of bytes.
        let mut source = CommandSource::new(&CaptureConfig {
            width: 2,
            height: 1,
            command: vec![
                "sh".into(),
                "-c".into(),
                "printf 'abcdefABCDEF'".into(),
            ],
            ..CaptureConfig::default()
        })
        .expect("construct source");
        source.open().await.expect("spawn");

        let first = source.next_frame().await.expect("read").expect("frame");
        assert_eq!(first.data, b"abcdef");
        assert_eq!(first.layout, PixelLayout::Bgr);
        let second = source.next_frame().await.expect("read").expect("frame");
        assert_eq!(second.data, b"ABCDEF");
        assert!(source.next_frame().await.expect("eof").is_none());
    }

    #[tokio::test]
    async fn next_frame_before_open_fails() {
        let mut source = CommandSource::new(&CaptureConfig {
            command: vec!["true".into()],
            ..CaptureConfig::default()
        })
        .expect("construct source");
        assert!(source.next_frame().await.is_err());
    }
}
