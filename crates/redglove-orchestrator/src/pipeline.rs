use redglove_gesture::{ButtonTransition, GestureStateMachine, PointerMapper};
use redglove_types::{
    config::RedgloveConfig,
    frame::{Frame, Rgb},
    geometry::ScreenPoint,
    input::InputAction,
    tracking::TrackState,
};
use redglove_vision::{draw_box, overlay_thickness, ColorTracker, Scan};

/// What one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub scan: Scan,
    pub screen: Option<ScreenPoint>,
    pub transition: Option<ButtonTransition>,
    /// Pointer move first, then at most one button change.
    pub actions: Vec<InputAction>,
}

/// The synchronous per-frame core: detect, map, debounce.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    mirror: bool,
    tracker: ColorTracker,
    mapper: PointerMapper,
    gesture: GestureStateMachine,
}

impl FramePipeline {
    pub fn new(config: &RedgloveConfig) -> Self {
        Self {
            mirror: config.capture.mirror,
            tracker: ColorTracker::new(&config.vision),
            mapper: PointerMapper::new(config.pointer.clone()),
            gesture: GestureStateMachine::new(&config.gesture),
        }
    }

    pub fn initial_state(config: &RedgloveConfig) -> TrackState {
        TrackState::new(
            config.gesture.initial_box_width,
            config.gesture.initial_box_height,
        )
    }

    /// Run one frame through the pipeline. Mutates `frame` (mirroring and
    /// target highlighting) and `state`.
    pub fn process(&self, frame: &mut Frame, state: &mut TrackState) -> FrameOutcome {
        if self.mirror {
            frame.mirror_horizontal();
        }

        let scan = self.tracker.scan(frame, state);
        let Some(detection) = scan.detection else {
            return FrameOutcome {
                scan,
                screen: None,
                transition: None,
                actions: Vec::new(),
            };
        };

        let screen = self.mapper.map(&detection, frame.width, frame.height);
        let mut actions = vec![InputAction::MoveTo {
            x: screen.x,
            y: screen.y,
        }];
        let transition = self.gesture.update(detection.bbox, state);
        if let Some(transition) = transition {
            actions.push(transition.into_action(self.gesture.button()));
        }

        FrameOutcome {
            scan,
            screen: Some(screen),
            transition,
            actions,
        }
    }

    /// Draw the last known box with a thickness encoding the button state.
    pub fn annotate(&self, frame: &mut Frame, state: &TrackState) {
        if let Some(bbox) = state.last_box {
            draw_box(frame, bbox, Rgb::WHITE, overlay_thickness(state.button_state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redglove_types::{
        frame::PixelLayout,
        geometry::{BoundingBox, Point},
        tracking::{ButtonState, ShapeTrend},
    };

    fn config() -> RedgloveConfig {
        let mut config = RedgloveConfig::default();
        config.capture.mirror = false;
        config
    }

    fn frame_with_block(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> Frame {
        let mut frame = Frame::new(width, height, PixelLayout::Bgr);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                frame.set_pixel(x, y, Rgb::new(200, 0, 0));
            }
        }
        frame
    }

    #[test]
    fn small_frame_block_is_resolved() {
        let pipeline = FramePipeline::new(&config());
        let mut state = TrackState::default();
        let mut frame = frame_with_block(4, 4, 1, 1, 2, 2);

        let outcome = pipeline.process(&mut frame, &mut state);
        let detection = outcome.scan.detection.expect("found");
        assert_eq!(detection.pixel_count, 4);
        assert_eq!(detection.centroid, Point::new(1, 1));
        assert_eq!(
            detection.bbox,
            BoundingBox {
                top: 1,
                bottom: 2,
                left: 1,
                right: 2
            }
        );
        assert_eq!(outcome.actions.len(), 1);
        assert!(matches!(outcome.actions[0], InputAction::MoveTo { .. }));
        assert_eq!(state.last_centroid, Some(Point::new(1, 1)));
    }

    #[test]
    fn empty_frame_emits_nothing_and_clears_centroid() {
        let pipeline = FramePipeline::new(&config());
        let mut state = TrackState {
            last_centroid: Some(Point::new(100, 100)),
            shape_trend: ShapeTrend::Shrinking,
            ..TrackState::default()
        };
        let mut frame = Frame::new(640, 480, PixelLayout::Bgr);

        let outcome = pipeline.process(&mut frame, &mut state);
        assert!(outcome.scan.detection.is_none());
        assert!(outcome.actions.is_empty());
        assert_eq!(state.last_centroid, None);
        // gesture history only moves on frames where the target is found
        assert_eq!(state.shape_trend, ShapeTrend::Shrinking);
    }

    #[test]
    fn closing_hand_emits_move_then_press() {
        let pipeline = FramePipeline::new(&config());
        let mut state = FramePipeline::initial_state(&config());

        // heights (bottom - top): 99 -> 69 -> 69
        let mut open = frame_with_block(640, 480, 300, 200, 40, 100);
        assert_eq!(pipeline.process(&mut open, &mut state).actions.len(), 1);
        let mut closing = frame_with_block(640, 480, 300, 215, 40, 70);
        assert_eq!(pipeline.process(&mut closing, &mut state).actions.len(), 1);
        assert_eq!(state.shape_trend, ShapeTrend::Shrinking);

        let mut closed = frame_with_block(640, 480, 300, 215, 40, 70);
        let outcome = pipeline.process(&mut closed, &mut state);
        assert_eq!(outcome.transition, Some(ButtonTransition::Press));
        assert_eq!(
            outcome.actions[1],
            InputAction::Button {
                button: 1,
                pressed: true
            }
        );
        assert_eq!(state.button_state, ButtonState::Down);
    }

    #[test]
    fn mirroring_flips_detected_position() {
        let mut mirrored = RedgloveConfig::default();
        mirrored.capture.mirror = true;
        let pipeline = FramePipeline::new(&mirrored);
        let mut state = TrackState::default();
        let mut frame = frame_with_block(640, 480, 0, 0, 10, 10);

        let detection = pipeline
            .process(&mut frame, &mut state)
            .scan
            .detection
            .expect("found");
        assert_eq!(detection.bbox.left, 630);
        assert_eq!(detection.bbox.right, 639);
    }

    #[test]
    fn annotation_reflects_button_state() {
        let pipeline = FramePipeline::new(&config());
        let bbox = BoundingBox {
            top: 10,
            bottom: 30,
            left: 10,
            right: 30,
        };
        let mut state = TrackState {
            last_box: Some(bbox),
            ..TrackState::default()
        };

        let mut up = Frame::new(64, 64, PixelLayout::Bgr);
        pipeline.annotate(&mut up, &state);
        assert_eq!(up.pixel(10, 20), Rgb::WHITE);
        assert_eq!(up.pixel(20, 20), Rgb::BLACK);

        state.button_state = ButtonState::Down;
        let mut down = Frame::new(64, 64, PixelLayout::Bgr);
        pipeline.annotate(&mut down, &state);
        assert_eq!(down.pixel(20, 20), Rgb::WHITE);
    }
}
