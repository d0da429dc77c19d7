use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RedgloveError, Result};

/// Byte order of the three channels in each pixel, as delivered by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelLayout {
    Rgb,
    /// Camera pipelines built on raw video usually hand out BGR.
    #[default]
    Bgr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A fixed-size three channel image owned by one pipeline tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    /// Packed pixels, three bytes each, row-major with no padding.
    pub data: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// All-black frame.
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> Self {
        Self {
            width,
            height,
            layout,
            data: vec![0; width as usize * height as usize * Self::CHANNELS],
            captured_at: Utc::now(),
        }
    }

    pub fn from_raw(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return Err(RedgloveError::Capture(format!(
                "frame buffer holds {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
            captured_at: Utc::now(),
        })
    }

    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * Self::CHANNELS
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * Self::CHANNELS
    }

    /// Pixel at column `x`, row `y`. Callers keep coordinates in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = self.offset(x, y);
        let px = &self.data[i..i + Self::CHANNELS];
        match self.layout {
            PixelLayout::Rgb => Rgb::new(px[0], px[1], px[2]),
            PixelLayout::Bgr => Rgb::new(px[2], px[1], px[0]),
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let i = self.offset(x, y);
        let bytes = match self.layout {
            PixelLayout::Rgb => [color.r, color.g, color.b],
            PixelLayout::Bgr => [color.b, color.g, color.r],
        };
        self.data[i..i + Self::CHANNELS].copy_from_slice(&bytes);
    }

    /// Flip around the vertical axis so the image behaves like a mirror.
    pub fn mirror_horizontal(&mut self) {
        let row_len = self.width as usize * Self::CHANNELS;
        if row_len == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(row_len) {
            let (mut left, mut right) = (0usize, self.width as usize - 1);
            while left < right {
                for c in 0..Self::CHANNELS {
                    row.swap(left * Self::CHANNELS + c, right * Self::CHANNELS + c);
                }
                left += 1;
                right -= 1;
            }
        }
    }

    /// Packed RGB copy, regardless of the source layout.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        match self.layout {
            PixelLayout::Rgb => self.data.clone(),
            PixelLayout::Bgr => self
                .data
                .chunks_exact(Self::CHANNELS)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
        }
    }
}
