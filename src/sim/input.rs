//! Player input snapshot

use serde::{Deserialize, Serialize};

/// Held-key state for one frame, filled in by the front-end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub brake: bool,
    pub pause: bool,
    pub radio: bool,
    pub free_ride: bool,
}

impl InputState {
    /// Flags that are down now but were up in `previous`
    pub fn pressed_since(&self, previous: &InputState) -> InputState {
        InputState {
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            accelerate: self.accelerate && !previous.accelerate,
            brake: self.brake && !previous.brake,
            pause: self.pause && !previous.pause,
            radio: self.radio && !previous.radio,
            free_ride: self.free_ride && !previous.free_ride,
        }
    }
}
