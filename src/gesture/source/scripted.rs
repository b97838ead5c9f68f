use anyhow::Context;
use log::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use std::vec;

use super::{FramePacer, GestureSource, Poll};
use crate::{
    gesture::{self, Hand, LANDMARK_COUNT},
    Finger, GestureState, Result,
};

const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default = "default_frame_interval_ms")]
    frame_interval_ms: u64,
    frames: Vec<ScriptFrame>,
}

fn default_frame_interval_ms() -> u64 {
    DEFAULT_FRAME_INTERVAL_MS
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScriptFrame {
    /// Extended fingers given directly, skipping landmark extraction.
    Fingers(Vec<Finger>),
    Hand(Hand),
    NoHand,
    Dropped,
    /// Repeat the last gesture state for this many frames.
    Repeat(u32),
}

/// Replays recorded frames, paced at the recording's frame interval.
pub struct ScriptedGestureSource {
    polls: vec::IntoIter<Poll>,
    pacer: FramePacer,
}

impl ScriptedGestureSource {
    pub fn new(polls: Vec<Poll>, frame_interval: Duration) -> Self {
        Self {
            polls: polls.into_iter(),
            pacer: FramePacer::new(frame_interval),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let script: Script = serde_yaml::from_str(yaml)?;

        let mut polls = Vec::with_capacity(script.frames.len());
        let mut last_state = GestureState::released();
        for (index, frame) in script.frames.into_iter().enumerate() {
            match frame {
                ScriptFrame::Fingers(fingers) => {
                    last_state = GestureState::from_fingers(&fingers);
                    polls.push(Poll::Frame(last_state));
                }
                ScriptFrame::Hand(hand) => {
                    if hand.landmarks.len() != LANDMARK_COUNT {
                        anyhow::bail!(
                            "Frame {} has {} landmarks, expected {}",
                            index,
                            hand.landmarks.len(),
                            LANDMARK_COUNT
                        );
                    }
                    last_state = gesture::extract(Some(&hand));
                    polls.push(Poll::Frame(last_state));
                }
                ScriptFrame::NoHand => {
                    last_state = gesture::extract(None);
                    polls.push(Poll::Frame(last_state));
                }
                ScriptFrame::Dropped => polls.push(Poll::Unavailable),
                ScriptFrame::Repeat(count) => {
                    polls.extend((0..count).map(|_| Poll::Frame(last_state)));
                }
            }
        }

        debug!("Loaded script with {} frames", polls.len());

        Ok(Self::new(
            polls,
            Duration::from_millis(script.frame_interval_ms),
        ))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Could not read script {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid script {}", path.display()))
    }
}

impl GestureSource for ScriptedGestureSource {
    fn poll(&mut self) -> Poll {
        match self.polls.next() {
            Some(poll) => {
                self.pacer.wait();
                poll
            }
            None => Poll::Quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::open_hand;
    use std::time::Instant;

    fn drain(mut source: ScriptedGestureSource) -> Vec<Poll> {
        let mut polls = Vec::new();
        loop {
            let poll = source.poll();
            polls.push(poll);
            if poll == Poll::Quit {
                return polls;
            }
        }
    }

    #[test]
    fn from_yaml() {
        let source = ScriptedGestureSource::from_yaml(
            r#"
frame_interval_ms: 0
frames:
  - fingers: [index, pinky]
  - repeat: 2
  - dropped
  - no_hand
  - fingers: []
"#,
        )
        .unwrap();

        let held = Poll::Frame(GestureState::from_fingers(&[Finger::Index, Finger::Pinky]));
        let released = Poll::Frame(GestureState::released());

        assert_eq!(
            drain(source),
            vec![held, held, held, Poll::Unavailable, released, released, Poll::Quit]
        );
    }

    #[test]
    fn hand_frames_go_through_extraction() {
        let landmarks: Vec<_> = open_hand()
            .landmarks
            .iter()
            .map(|landmark| format!("[{}, {}]", landmark.x, landmark.y))
            .collect();
        let yaml = format!(
            "frame_interval_ms: 0\nframes:\n  - hand:\n      landmarks: [{}]\n      fingers_up: [false, false, true, false, false]\n",
            landmarks.join(", ")
        );

        let polls = drain(ScriptedGestureSource::from_yaml(&yaml).unwrap());

        assert_eq!(
            polls,
            vec![
                Poll::Frame(GestureState::from_fingers(&[Finger::Middle])),
                Poll::Quit
            ]
        );
    }

    #[test]
    fn demo_script() {
        let mut source =
            ScriptedGestureSource::from_yaml(include_str!("../../../demos/flicker.yaml")).unwrap();
        source.pacer = FramePacer::new(Duration::ZERO);

        let polls = drain(source);

        assert_eq!(polls.len(), 217);
        assert_eq!(
            polls.iter().filter(|&&poll| poll == Poll::Unavailable).count(),
            1
        );
        assert_eq!(polls[1], Poll::Frame(GestureState::from_fingers(&[Finger::Index])));
    }

    #[test]
    fn rejects_short_landmark_lists() {
        let yaml = "frames:\n  - hand:\n      landmarks: [[1, 2], [3, 4]]\n";

        assert!(ScriptedGestureSource::from_yaml(yaml).is_err());
    }

    #[test]
    fn paces_frames() {
        let frame = Poll::Frame(GestureState::released());
        let mut source = ScriptedGestureSource::new(vec![frame; 4], Duration::from_millis(20));

        let started = Instant::now();
        while source.poll() != Poll::Quit {}

        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
