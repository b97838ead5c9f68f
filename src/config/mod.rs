pub mod midi;

use midi::Midi;

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Finger, Result};

const DEFAULT_SUSTAIN_MS: u64 = 1500;
const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub midi: Midi,
    #[serde(default = "default_sustain_ms")]
    pub sustain_ms: u64,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub chords: Chords,
    #[serde(default)]
    pub source: Source,
}

impl Config {
    pub fn from(yaml: &str) -> Result<Config> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::from(&yaml).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn sustain(&self) -> Duration {
        Duration::from_millis(self.sustain_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            midi: Midi::default(),
            sustain_ms: DEFAULT_SUSTAIN_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            chords: Chords::default(),
            source: Source::default(),
        }
    }
}

fn default_sustain_ms() -> u64 {
    DEFAULT_SUSTAIN_MS
}

fn default_frame_interval_ms() -> u64 {
    DEFAULT_FRAME_INTERVAL_MS
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ChordEntry {
    pub name: String,
    /// Space separated note names, e.g. `D4 F#4 A4`.
    pub notes: String,
}

impl ChordEntry {
    fn new(name: &str, notes: &str) -> Self {
        Self {
            name: name.into(),
            notes: notes.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Chords {
    pub index: ChordEntry,
    pub middle: ChordEntry,
    pub pinky: ChordEntry,
}

impl Chords {
    pub fn entry(&self, finger: Finger) -> &ChordEntry {
        match finger {
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
            Finger::Pinky => &self.pinky,
        }
    }
}

impl Default for Chords {
    fn default() -> Self {
        Self {
            index: ChordEntry::new("D Major", "D4 F#4 A4"),
            middle: ChordEntry::new("G Major", "G4 B4 D5"),
            pinky: ChordEntry::new("A Major", "A4 C#5 E5"),
        }
    }
}

/// Where the per-frame gestures come from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Keyboard,
    Script(PathBuf),
}

impl Default for Source {
    fn default() -> Self {
        Source::Keyboard
    }
}
