//! Landmark based finger extension.
//!
//! The landmark model itself runs elsewhere; this module only turns its
//! output for one hand into a [`GestureState`].

pub mod source;

use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::{Finger, GestureState};

/// Points in the hand model, wrist first.
pub const LANDMARK_COUNT: usize = 21;

/// Minimum fingertip to knuckle distance, in pixels, for a finger to count as
/// extended.
pub const DISTANCE_THRESHOLD: f32 = 50.0;

/// A landmark position in image pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(from = "(f32, f32)")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f32, f32)> for Landmark {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// One detected hand.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
    /// Thumb-to-pinky classification from the detector, when it provides one.
    #[serde(default)]
    pub fingers_up: Option<[bool; 5]>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>, fingers_up: Option<[bool; 5]>) -> Self {
        Self {
            landmarks,
            fingers_up,
        }
    }

    fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Whether the finger is classified as up. Without a detector
    /// classification the tip has to sit above the joint two landmarks
    /// below it (smaller y is higher in image coordinates).
    pub fn is_finger_up(&self, finger: Finger) -> bool {
        if let Some(fingers_up) = self.fingers_up {
            return fingers_up[finger.fingers_up_slot()];
        }

        let tip = finger.tip_landmark();
        match (self.landmark(tip), self.landmark(tip - 2)) {
            (Some(tip), Some(pip)) => tip.y < pip.y,
            _ => false,
        }
    }

    pub fn reach(&self, finger: Finger) -> Option<f32> {
        let tip = self.landmark(finger.tip_landmark())?;
        let joint = self.landmark(finger.joint_landmark())?;
        Some(tip.distance(joint))
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.is_finger_up(finger)
            && self
                .reach(finger)
                .map_or(false, |reach| reach > DISTANCE_THRESHOLD)
    }
}

/// Builds the frame's gesture state. A frame without a hand has every
/// finger down.
pub fn extract(hand: Option<&Hand>) -> GestureState {
    let mut state = GestureState::released();
    if let Some(hand) = hand {
        for finger in Finger::iter() {
            state.set(finger, hand.is_extended(finger));
        }
    }
    state
}
