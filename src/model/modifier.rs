use combine::{choice, optional, token, Parser, Stream};
use core::fmt;
use strum_macros::EnumIter;
use Modifier::*;

#[derive(Clone, Copy, Debug, EnumIter, Eq, PartialEq)]
pub enum Modifier {
    Flat,
    Natural,
    Sharp,
}

impl Modifier {
    pub fn parser<Input>() -> impl Parser<Input, Output = Self>
    where
        Input: Stream<Token = char>,
    {
        let flat_parser = token('b').map(|_| Flat);
        let sharp_parser = token('#').map(|_| Sharp);

        optional(choice((flat_parser, sharp_parser)))
            .map(|modifier| modifier.unwrap_or(Natural))
    }

    pub fn semitones(&self) -> i16 {
        match self {
            Flat => -1,
            Natural => 0,
            Sharp => 1,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Flat => "b",
            Natural => "",
            Sharp => "#",
        };

        f.write_str(string)
    }
}
