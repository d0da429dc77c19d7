use redglove_types::{
    config::VisionConfig,
    frame::{Frame, Rgb},
    geometry::{BoundingBox, SearchWindow},
};

/// Fixed color rule for "red glove" pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorThreshold {
    pub red_min: u8,
    pub green_max: u8,
    pub blue_max: u8,
}

impl ColorThreshold {
    pub fn from_config(config: &VisionConfig) -> Self {
        Self {
            red_min: config.red_min,
            green_max: config.green_max,
            blue_max: config.blue_max,
        }
    }

    pub fn matches(&self, px: Rgb) -> bool {
        px.g < self.green_max && px.b < self.blue_max && px.r > self.red_min
    }
}

impl Default for ColorThreshold {
    fn default() -> Self {
        Self::from_config(&VisionConfig::default())
    }
}

/// Raw accumulators gathered while scanning a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segmentation {
    pub x_sum: u64,
    pub y_sum: u64,
    pub count: u64,
    /// `None` until the first target pixel is seen.
    pub bbox: Option<BoundingBox>,
}

impl Segmentation {
    fn accept(&mut self, x: u32, y: u32) {
        self.x_sum += u64::from(x);
        self.y_sum += u64::from(y);
        self.count += 1;
        match self.bbox.as_mut() {
            Some(bbox) => bbox.extend(x, y),
            None => self.bbox = Some(BoundingBox::at(x, y)),
        }
    }
}

/// Classify every pixel of `window` against `threshold`.
///
/// When `highlight` is set, each matching pixel is repainted pure red in `frame`
/// so the rendered output shows exactly what was detected. The frame is the only
/// thing mutated; tracking state is left to the resolver.
pub fn segment(
    frame: &mut Frame,
    window: SearchWindow,
    threshold: &ColorThreshold,
    highlight: bool,
) -> Segmentation {
    let mut seg = Segmentation::default();
    let xmax = window.xmax.min(frame.width);
    let ymax = window.ymax.min(frame.height);

    for y in window.ymin..ymax {
        for x in window.xmin..xmax {
            if !threshold.matches(frame.pixel(x, y)) {
                continue;
            }
            if highlight {
                frame.set_pixel(x, y, Rgb::RED);
            }
            seg.accept(x, y);
        }
    }
    seg
}

#[cfg(test)]
mod tests {
    use super::*;
    use redglove_types::frame::PixelLayout;

    fn block_frame() -> Frame {
        let mut frame = Frame::new(4, 4, PixelLayout::Bgr);
        for y in 1..=2 {
            for x in 1..=2 {
                frame.set_pixel(x, y, Rgb::new(200, 0, 0));
            }
        }
        frame
    }

    #[test]
    fn threshold_boundaries_are_exclusive() {
        let rule = ColorThreshold::default();
        assert!(rule.matches(Rgb::new(129, 31, 31)));
        assert!(!rule.matches(Rgb::new(128, 0, 0)));
        assert!(!rule.matches(Rgb::new(255, 32, 0)));
        assert!(!rule.matches(Rgb::new(255, 0, 32)));
    }

    #[test]
    fn accumulates_block_sums_and_bounds() {
        let mut frame = block_frame();
        let seg = segment(
            &mut frame,
            SearchWindow::full(4, 4),
            &ColorThreshold::default(),
            true,
        );
        assert_eq!(seg.count, 4);
        assert_eq!(seg.x_sum, 6);
        assert_eq!(seg.y_sum, 6);
        assert_eq!(
            seg.bbox,
            Some(BoundingBox {
                top: 1,
                bottom: 2,
                left: 1,
                right: 2
            })
        );
        assert_eq!(frame.pixel(1, 1), Rgb::RED);
        assert_eq!(frame.pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn only_scans_inside_window() {
        let mut frame = block_frame();
        let window = SearchWindow {
            xmin: 0,
            xmax: 2,
            ymin: 0,
            ymax: 2,
        };
        let seg = segment(&mut frame, window, &ColorThreshold::default(), true);
        assert_eq!(seg.count, 1);
        assert_eq!(seg.bbox, Some(BoundingBox::at(1, 1)));
        // Outside the window the pixel keeps its original colour.
        assert_eq!(frame.pixel(2, 2), Rgb::new(200, 0, 0));
    }

    #[test]
    fn empty_window_finds_nothing() {
        let mut frame = block_frame();
        let window = SearchWindow {
            xmin: 2,
            xmax: 2,
            ymin: 0,
            ymax: 4,
        };
        let seg = segment(&mut frame, window, &ColorThreshold::default(), true);
        assert_eq!(seg, Segmentation::default());
    }

    #[test]
    fn highlight_can_be_disabled() {
        let mut frame = block_frame();
        segment(
            &mut frame,
            SearchWindow::full(4, 4),
            &ColorThreshold::default(),
            false,
        );
        assert_eq!(frame.pixel(1, 1), Rgb::new(200, 0, 0));
    }
}
