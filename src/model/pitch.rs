use crate::{Letter, Modifier, Result};
use anyhow::anyhow;
use combine::{optional, parser::char::digit, token, Parser, Stream};
use std::convert::TryFrom;
use std::fmt;
use wmidi::Note;

/// A note name such as `D4`, `F#4` or `Bb-1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pitch {
    pub letter: Letter,
    pub modifier: Modifier,
    pub octave: i8,
}

impl Pitch {
    pub fn new(letter: Letter, modifier: Modifier, octave: i8) -> Self {
        Self {
            letter,
            modifier,
            octave,
        }
    }

    pub fn parser<Input>() -> impl Parser<Input, Output = Self>
    where
        Input: Stream<Token = char>,
    {
        let octave_parser = (optional(token('-')), digit()).map(|(negative, digit)| {
            let value = (digit as u8 - b'0') as i8;
            negative.map_or(value, |_| -value)
        });

        (Letter::parser(), Modifier::parser(), octave_parser)
            .map(|(letter, modifier, octave)| Self::new(letter, modifier, octave))
    }

    pub fn midi_number(&self) -> i16 {
        (self.octave as i16 + 1) * 12 + self.letter.semitones() + self.modifier.semitones()
    }

    pub fn to_note(&self) -> Result<Note> {
        u8::try_from(self.midi_number())
            .ok()
            .and_then(|number| Note::try_from(number).ok())
            .ok_or_else(|| anyhow!("{} is outside of the MIDI note range", self))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format!("{}{}{}", self.letter, self.modifier, self.octave))
    }
}
