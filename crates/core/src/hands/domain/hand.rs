use serde::{Deserialize, Serialize};

/// Gesture assigned to a hand candidate.
///
/// `Unknown` only appears before classification; every classified
/// candidate ends up in one of the other three states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Unknown,
    OpenPalm,
    SpreadPalm,
    ClosedPalm,
}

/// One recognized hand within a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    /// Palm centroid, from the enclosing circle's center (truncated).
    pub x: i32,
    pub y: i32,
    /// Sequential within the frame, starting at 1.
    pub id: u32,
    pub state: GestureState,
}

impl Hand {
    pub fn new(x: i32, y: i32, id: u32) -> Self {
        Self {
            x,
            y,
            id,
            state: GestureState::default(),
        }
    }

    pub fn with_state(mut self, state: GestureState) -> Self {
        self.state = state;
        self
    }
}
