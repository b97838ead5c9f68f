use crate::{Pitch, Result};
use anyhow::anyhow;
use combine::{
    eof,
    parser::char::space,
    sep_by1, skip_many1, Parser, Stream,
};
use std::fmt;
use wmidi::Note;

/// The notes sounded together for one finger, in order and without duplicates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chord {
    notes: Vec<Note>,
}

impl Chord {
    pub fn new(notes: &[Note]) -> Self {
        let mut unique: Vec<Note> = Vec::with_capacity(notes.len());
        for &note in notes {
            if !unique.contains(&note) {
                unique.push(note);
            }
        }

        Self { notes: unique }
    }

    pub fn parser<Input>() -> impl Parser<Input, Output = Vec<Pitch>>
    where
        Input: Stream<Token = char>,
    {
        sep_by1::<Vec<Pitch>, _, _, _>(Pitch::parser(), skip_many1(space()))
    }

    pub fn parse(string: &str) -> Result<Self> {
        let (pitches, _) = (Self::parser::<&str>(), eof())
            .map(|(pitches, _)| pitches)
            .parse(string.trim())
            .map_err(|err| anyhow!("Could not parse chord '{}': {}", string, err))?;

        let notes = pitches
            .iter()
            .map(Pitch::to_note)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(&notes))
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = self
            .notes
            .iter()
            .map(|&note| u8::from(note).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&string)
    }
}
