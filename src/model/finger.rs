use serde::Deserialize;
use strum_macros::{Display, EnumCount, EnumIter};

/// A finger that can trigger a chord. Iteration order is the order in which
/// edges are processed each frame.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumCount, EnumIter, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Pinky,
}

impl Finger {
    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn bit(self) -> u8 {
        1 << self.slot()
    }

    /// Landmark of the fingertip in the 21-point hand model.
    pub fn tip_landmark(self) -> usize {
        match self {
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Pinky => 20,
        }
    }

    /// Landmark the fingertip is measured against (the knuckle at the base
    /// of the finger).
    pub fn joint_landmark(self) -> usize {
        match self {
            Finger::Index => 5,
            Finger::Middle => 9,
            Finger::Pinky => 17,
        }
    }

    /// Position in the detector's thumb-to-pinky fingers-up array.
    pub fn fingers_up_slot(self) -> usize {
        match self {
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Pinky => 4,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Finger::Index => "green",
            Finger::Middle => "blue",
            Finger::Pinky => "cyan",
        }
    }
}
