//! Per-frame gesture input.
//!
//! The frame loop doesn't care whether a frame came from a recorded script
//! or the keyboard simulator; it only sees [`Poll`]s.

mod keyboard;
mod scripted;

pub use keyboard::KeyboardGestureSource;
pub use scripted::ScriptedGestureSource;

use std::time::{Duration, Instant};

use crate::GestureState;

/// Outcome of asking a source for the next frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Poll {
    Frame(GestureState),
    /// The camera produced no frame this time around.
    Unavailable,
    Quit,
}

pub trait GestureSource {
    fn poll(&mut self) -> Poll;
}

impl<TSource: GestureSource + ?Sized> GestureSource for Box<TSource> {
    fn poll(&mut self) -> Poll {
        (**self).poll()
    }
}

/// Spaces frames out at a fixed interval without drifting.
#[derive(Debug)]
pub(crate) struct FramePacer {
    interval: Duration,
    next_frame_at: Option<Instant>,
}

impl FramePacer {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_frame_at: None,
        }
    }

    /// Blocks until the next frame is due. The first call returns at once.
    pub(crate) fn wait(&mut self) {
        let now = Instant::now();
        if let Some(next_frame_at) = self.next_frame_at {
            spin_sleep::sleep(next_frame_at.saturating_duration_since(now));
        }
        self.next_frame_at = Some(self.next_frame_at.unwrap_or(now).max(now) + self.interval);
    }
}
