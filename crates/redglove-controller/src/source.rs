use std::f64::consts::TAU;

use async_trait::async_trait;
use redglove_types::{
    config::CaptureConfig,
    frame::{Frame, PixelLayout, Rgb},
    Result,
};
use tokio::time::{sleep, Duration};
use tracing::info;

/// Producer of fixed-size frames. `Ok(None)` marks the end of the stream.
#[async_trait]
pub trait FrameSource: Send {
    async fn open(&mut self) -> Result<()>;
    async fn next_frame(&mut self) -> Result<Option<Frame>>;
}

#[async_trait]
impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    async fn open(&mut self) -> Result<()> {
        (**self).open().await
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame().await
    }
}

const ORBIT_FRAMES: u64 = 120;
const OPEN_SIDE: u32 = 120;
const CLOSED_SIDE: u32 = 60;
const GLOVE: Rgb = Rgb::new(210, 12, 8);

/// Renders a red square orbiting the frame centre that alternates between an
/// open and a closed size every `gesture_period` frames.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    gesture_period: u64,
    interval: Duration,
    frame_limit: Option<u64>,
    produced: u64,
}

impl SyntheticSource {
    pub fn new(config: &CaptureConfig, frame_limit: Option<u64>) -> Self {
        Self {
            width: config.width,
            height: config.height,
            gesture_period: u64::from(config.synthetic_gesture_period.max(1)),
            interval: Duration::from_millis(config.frame_interval_ms),
            frame_limit,
            produced: 0,
        }
    }

    /// Side length of the square at frame `index`.
    pub fn side_at(&self, index: u64) -> u32 {
        let side = if (index / self.gesture_period) % 2 == 0 {
            OPEN_SIDE
        } else {
            CLOSED_SIDE
        };
        side.min(self.width).min(self.height)
    }

    fn render(&self, index: u64) -> Frame {
        let mut frame = Frame::new(self.width, self.height, PixelLayout::Bgr);
        let side = self.side_at(index);
        let angle = (index % ORBIT_FRAMES) as f64 / ORBIT_FRAMES as f64 * TAU;
        let cx = f64::from(self.width) / 2.0 + f64::from(self.width) / 4.0 * angle.cos();
        let cy = f64::from(self.height) / 2.0 + f64::from(self.height) / 4.0 * angle.sin();

        let x0 = (cx as u32).saturating_sub(side / 2).min(self.width - side);
        let y0 = (cy as u32).saturating_sub(side / 2).min(self.height - side);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                frame.set_pixel(x, y, GLOVE);
            }
        }
        frame
    }
}

#[async_trait]
impl FrameSource for SyntheticSource {
    async fn open(&mut self) -> Result<()> {
        info!(
            "Synthetic source {}x{}, gesture period {} frames",
            self.width, self.height, self.gesture_period
        );
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.frame_limit.is_some_and(|limit| self.produced >= limit) {
            return Ok(None);
        }
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
        let frame = self.render(self.produced);
        self.produced += 1;
        Ok(Some(frame))
    }
}
