mod chord_lifecycle;
pub mod config;
mod frame_loop;
pub mod gesture;
pub mod midi;
mod model;
mod result;

pub use chord_lifecycle::{ActiveNotes, ChordLifecycleController, NoteClaim, PendingRelease};
pub use config::Config;
pub use frame_loop::{status_line, FrameLoop, FrameStats};
pub use gesture::source::{GestureSource, KeyboardGestureSource, Poll, ScriptedGestureSource};
pub use model::{
    chord::Chord,
    chord_mapping::{ChordMapping, MappedChord},
    finger::Finger,
    gesture_state::GestureState,
    letter::Letter,
    modifier::Modifier,
    pitch::Pitch,
};
pub use result::Result;
