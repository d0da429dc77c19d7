use redglove_types::{
    config::GestureConfig,
    geometry::BoundingBox,
    input::{ButtonId, InputAction},
    tracking::{ButtonState, ShapeTrend, TrackState},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A committed change of the button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonTransition {
    Press,
    Release,
}

impl ButtonTransition {
    pub fn into_action(self, button: ButtonId) -> InputAction {
        InputAction::Button {
            button,
            pressed: self == ButtonTransition::Press,
        }
    }
}

/// Debounces bounding-box height changes into button presses and releases.
///
/// A shrinking box means the hand is closing (button down), a growing box means it
/// is opening (button up). A trend is only committed on a later frame once the
/// height has settled, i.e. changed by less than `1 - change_factor` of the
/// previous height.
///
/// NOTE: committing on "height stopped changing" rather than "height changed
/// enough" looks like it may invert the intended trigger. It is kept as is so
/// existing users see the same click timing.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    change_factor: f64,
    button: ButtonId,
}

impl GestureStateMachine {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            change_factor: config.change_factor,
            button: config.button,
        }
    }

    pub fn button(&self) -> ButtonId {
        self.button
    }

    /// Feed the box of a frame where the target was found.
    pub fn update(&self, bbox: BoundingBox, state: &mut TrackState) -> Option<ButtonTransition> {
        let this_height = bbox.height();
        let this_width = bbox.width();
        let last_height = f64::from(state.last_box_height);
        let height = f64::from(this_height);

        let mut transition = None;
        let settled = (last_height - height).abs() < last_height * (1.0 - self.change_factor);
        if state.shape_trend != ShapeTrend::None && settled {
            let committed = match state.shape_trend {
                ShapeTrend::Growing => ButtonState::Up,
                _ => ButtonState::Down,
            };
            transition = match (state.button_state, committed) {
                (ButtonState::Up, ButtonState::Down) => Some(ButtonTransition::Press),
                (ButtonState::Down, ButtonState::Up) => Some(ButtonTransition::Release),
                _ => None,
            };
            if transition.is_some() {
                debug!(?committed, trend = ?state.shape_trend, "button state committed");
            }
            state.button_state = committed;
        }

        state.shape_trend = if height < last_height * self.change_factor {
            ShapeTrend::Shrinking
        } else if height * self.change_factor > last_height {
            ShapeTrend::Growing
        } else {
            ShapeTrend::None
        };

        state.last_box_height = this_height;
        state.last_box_width = this_width;
        transition
    }
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}
