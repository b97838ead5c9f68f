use crate::Finger;
use std::ops::Index;
use strum::{EnumCount, IntoEnumIterator};

/// Per-finger "extended" flags for a single frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GestureState {
    extended: [bool; Finger::COUNT],
}

impl GestureState {
    /// Every finger down, which is also what a frame without a hand reads as.
    pub fn released() -> Self {
        Self::default()
    }

    pub fn from_fingers(fingers: &[Finger]) -> Self {
        let mut state = Self::released();
        for &finger in fingers {
            state.set(finger, true);
        }
        state
    }

    pub fn set(&mut self, finger: Finger, extended: bool) {
        self.extended[finger.slot()] = extended;
    }

    pub fn toggle(&mut self, finger: Finger) {
        self.extended[finger.slot()] = !self.extended[finger.slot()];
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger.slot()]
    }

    pub fn extended_fingers(&self) -> impl Iterator<Item = Finger> + '_ {
        Finger::iter().filter(move |&finger| self.is_extended(finger))
    }
}

impl Index<Finger> for GestureState {
    type Output = bool;

    fn index(&self, finger: Finger) -> &bool {
        &self.extended[finger.slot()]
    }
}
