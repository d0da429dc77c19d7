use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use image::{imageops::FilterType, ImageFormat};
use redglove_types::{
    config::CaptureConfig,
    frame::{Frame, PixelLayout},
    Result,
};
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::{capture_error, check_dimensions, FrameSource};

/// Replays a directory of PNG files in lexical order, scaled to the frame size.
pub struct ImageSequenceSource {
    dir: PathBuf,
    width: u32,
    height: u32,
    interval: Duration,
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        let dir = config
            .image_dir
            .as_ref()
            .map(PathBuf::from)
            .ok_or_else(|| capture_error("image source needs capture.image_dir"))?;
        Ok(Self {
            dir,
            width: config.width,
            height: config.height,
            interval: Duration::from_millis(config.frame_interval_ms),
            pending: VecDeque::new(),
        })
    }

    async fn load(&self, path: &Path) -> Result<Frame> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|err| capture_error(format!("failed to read {}: {err}", path.display())))?;
        let img = image::load_from_memory_with_format(&raw, ImageFormat::Png)
            .map_err(|err| capture_error(format!("failed to decode {}: {err}", path.display())))?;
        let mut rgb = img.to_rgb8();
        if rgb.dimensions() != (self.width, self.height) {
            debug!(
                "resizing {} from {:?} to {}x{}",
                path.display(),
                rgb.dimensions(),
                self.width,
                self.height
            );
            rgb = image::imageops::resize(&rgb, self.width, self.height, FilterType::Triangle);
        }
        let (width, height) = rgb.dimensions();
        let frame = Frame::from_raw(width, height, PixelLayout::Rgb, rgb.into_raw())?;
        check_dimensions(&frame, self.width, self.height)?;
        Ok(frame)
    }
}

#[async_trait]
impl FrameSource for ImageSequenceSource {
    async fn open(&mut self) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|err| {
            capture_error(format!("failed to list {}: {err}", self.dir.display()))
        })?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| capture_error(format!("failed to list {}: {err}", self.dir.display())))?
        {
            let path = entry.path();
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if is_png {
                files.push(path);
            }
        }
        files.sort();
        info!("Image source: {} frames in {}", files.len(), self.dir.display());
        self.pending = files.into();
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
        self.load(&path).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb as Px, RgbImage};
    use redglove_types::frame::Rgb;

    #[tokio::test]
    async fn replays_png_files_in_order() {
        let dir = std::env::temp_dir().join(format!("redglove-images-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");

        let mut second = RgbImage::new(8, 6);
        second.put_pixel(2, 3, Px([200, 0, 0]));
        second.save(dir.join("b.png")).expect("write b");
        RgbImage::new(8, 6).save(dir.join("a.png")).expect("write a");
        std::fs::write(dir.join("notes.txt"), "ignored").expect("write txt");

        let mut source = ImageSequenceSource::new(&CaptureConfig {
            width: 8,
            height: 6,
            image_dir: Some(dir.to_string_lossy().into_owned()),
            ..CaptureConfig::default()
        })
        .expect("construct source");
        source.open().await.expect("open");

        let first = source.next_frame().await.expect("a").expect("frame a");
        assert_eq!(first.pixel(2, 3), Rgb::BLACK);
        let second = source.next_frame().await.expect("b").expect("frame b");
        assert_eq!(second.layout, PixelLayout::Rgb);
        assert_eq!(second.pixel(2, 3), Rgb::new(200, 0, 0));
        assert!(source.next_frame().await.expect("end").is_none());

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[tokio::test]
    async fn resizes_to_configured_geometry() {
        let dir = std::env::temp_dir().join(format!("redglove-resize-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");
        RgbImage::new(16, 12).save(dir.join("big.png")).expect("write");

        let mut source = ImageSequenceSource::new(&CaptureConfig {
            width: 8,
            height: 6,
            image_dir: Some(dir.to_string_lossy().into_owned()),
            ..CaptureConfig::default()
        })
        .expect("construct source");
        source.open().await.expect("open");
        let frame = source.next_frame().await.expect("read").expect("frame");
        assert_eq!((frame.width, frame.height), (8, 6));

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn requires_image_dir() {
        assert!(ImageSequenceSource::new(&CaptureConfig::default()).is_err());
    }
}
