use combine::{choice, token, Parser, Stream};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, PartialEq)]
pub enum Letter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Letter {
    pub fn parser<Input>() -> impl Parser<Input, Output = Self>
    where
        Input: Stream<Token = char>,
    {
        choice((
            token('A').map(|_| Letter::A),
            token('B').map(|_| Letter::B),
            token('C').map(|_| Letter::C),
            token('D').map(|_| Letter::D),
            token('E').map(|_| Letter::E),
            token('F').map(|_| Letter::F),
            token('G').map(|_| Letter::G),
        ))
    }

    /// Semitones above C within the same octave.
    pub fn semitones(&self) -> i16 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }
}
