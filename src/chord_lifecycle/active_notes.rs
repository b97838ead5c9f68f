use log::*;
use std::sync::{Mutex, MutexGuard, PoisonError};
use wmidi::Note;

use crate::{midi::NoteOutputPort, Chord, Finger};

const NOTE_COUNT: usize = 128;

#[derive(Clone, Copy, Debug, Default)]
struct NoteRecord {
    /// The last command sent for this note was a note-on.
    sounding: bool,
    /// Fingers whose chord currently holds the note.
    holders: u8,
    /// Bumped whenever `holders` changes.
    revision: u64,
}

/// A note a released chord wants turned off, stamped with the note's
/// revision at the moment of release.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NoteClaim {
    pub note: Note,
    pub revision: u64,
}

/// The notes currently sounding, together with the port they sound on.
///
/// Keeping the port in here means a single lock covers both the membership
/// check and the command that follows it.
pub struct ActiveNotes<TPort> {
    port: TPort,
    velocity: u8,
    records: [NoteRecord; NOTE_COUNT],
}

impl<TPort: NoteOutputPort> ActiveNotes<TPort> {
    pub fn new(port: TPort, velocity: u8) -> Self {
        Self {
            port,
            velocity,
            records: [NoteRecord::default(); NOTE_COUNT],
        }
    }

    fn record(&mut self, note: Note) -> &mut NoteRecord {
        &mut self.records[u8::from(note) as usize]
    }

    /// Holds every note of the chord for `finger`, sending note-on for the
    /// ones that aren't already sounding.
    pub fn play_chord(&mut self, finger: Finger, chord: &Chord) {
        for &note in chord.notes() {
            let record = self.record(note);
            record.holders |= finger.bit();
            record.revision += 1;
            if record.sounding {
                continue;
            }
            record.sounding = true;

            if let Err(err) = self.port.note_on(note, self.velocity) {
                warn!("note on {:?} failed: {:#}", note, err);
            }
        }
    }

    /// Lets go of `finger`'s hold on the chord. Nothing is sent; the
    /// returned claims are what a later [`release`](Self::release) acts on.
    pub fn unhold_chord(&mut self, finger: Finger, chord: &Chord) -> Vec<NoteClaim> {
        chord
            .notes()
            .iter()
            .map(|&note| {
                let record = self.record(note);
                record.holders &= !finger.bit();
                record.revision += 1;
                NoteClaim {
                    note,
                    revision: record.revision,
                }
            })
            .collect()
    }

    /// Sends note-off for each claimed note that is still sounding, held by
    /// no chord, and untouched since it was claimed. Returns how many notes
    /// were turned off.
    pub fn release(&mut self, claims: &[NoteClaim]) -> usize {
        let mut released = 0;
        for claim in claims {
            let record = self.record(claim.note);
            if !record.sounding || record.holders != 0 || record.revision != claim.revision {
                continue;
            }
            record.sounding = false;
            released += 1;

            if let Err(err) = self.port.note_off(claim.note, self.velocity) {
                warn!("note off {:?} failed: {:#}", claim.note, err);
            }
        }
        released
    }

    /// Turns off everything still sounding, regardless of holders.
    pub fn flush(&mut self) {
        for note in self.sounding() {
            let record = self.record(note);
            record.sounding = false;
            record.holders = 0;
            record.revision += 1;

            if let Err(err) = self.port.note_off(note, self.velocity) {
                warn!("note off {:?} failed: {:#}", note, err);
            }
        }
    }

    pub fn is_sounding(&self, note: Note) -> bool {
        self.records[u8::from(note) as usize].sounding
    }

    pub fn sounding(&self) -> Vec<Note> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.sounding)
            .map(|(number, _)| Note::from_u8_lossy(number as u8))
            .collect()
    }
}

/// Locks the shared set. A panic on another thread leaves the set
/// consistent, so a poisoned lock is taken over rather than propagated.
pub fn lock<TPort>(active_notes: &Mutex<ActiveNotes<TPort>>) -> MutexGuard<'_, ActiveNotes<TPort>> {
    active_notes.lock().unwrap_or_else(PoisonError::into_inner)
}
