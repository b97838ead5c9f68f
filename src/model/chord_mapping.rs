use crate::{config::Chords, Chord, Finger, Result};
use anyhow::Context;
use strum::{EnumCount, IntoEnumIterator};
use wmidi::Note;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MappedChord {
    pub name: String,
    pub chord: Chord,
}

/// Which chord each finger plays. Built once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChordMapping {
    entries: [MappedChord; Finger::COUNT],
}

impl ChordMapping {
    pub fn new(index: MappedChord, middle: MappedChord, pinky: MappedChord) -> Self {
        Self {
            entries: [index, middle, pinky],
        }
    }

    pub fn from_config(chords: &Chords) -> Result<Self> {
        let mapped = |finger: Finger| -> Result<MappedChord> {
            let entry = chords.entry(finger);
            let chord = Chord::parse(&entry.notes)
                .with_context(|| format!("Invalid chord for the {} finger", finger))?;
            Ok(MappedChord {
                name: entry.name.clone(),
                chord,
            })
        };

        Ok(Self::new(
            mapped(Finger::Index)?,
            mapped(Finger::Middle)?,
            mapped(Finger::Pinky)?,
        ))
    }

    pub fn chord(&self, finger: Finger) -> &Chord {
        &self.entries[finger.slot()].chord
    }

    pub fn name(&self, finger: Finger) -> &str {
        &self.entries[finger.slot()].name
    }

    pub fn iter(&self) -> impl Iterator<Item = (Finger, &MappedChord)> {
        Finger::iter().map(move |finger| (finger, &self.entries[finger.slot()]))
    }
}

impl Default for ChordMapping {
    fn default() -> Self {
        let mapped = |name: &str, notes: &[Note]| MappedChord {
            name: name.into(),
            chord: Chord::new(notes),
        };

        Self::new(
            mapped("D Major", &[Note::D4, Note::Gb4, Note::A4]),
            mapped("G Major", &[Note::G4, Note::B4, Note::D5]),
            mapped("A Major", &[Note::A4, Note::Db5, Note::E5]),
        )
    }
}
