use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The six Holland interest codes, laid out on the RIASEC hexagon in the
/// fixed cyclic order r → i → a → s → e → c → r. Declaration order doubles
/// as the default priority order used for every deterministic tie-break.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum Code {
    #[serde(rename = "r")]
    Realistic,
    #[serde(rename = "i")]
    Investigative,
    #[serde(rename = "a")]
    Artistic,
    #[serde(rename = "s")]
    Social,
    #[serde(rename = "e")]
    Enterprising,
    #[serde(rename = "c")]
    Conventional,
}

impl Code {
    /// All six codes in hexagon order (also the default priority order).
    pub const ALL: [Code; 6] = [
        Code::Realistic,
        Code::Investigative,
        Code::Artistic,
        Code::Social,
        Code::Enterprising,
        Code::Conventional,
    ];

    /// Position on the hexagon ring, 0..=5.
    pub const fn index(self) -> usize {
        match self {
            Code::Realistic => 0,
            Code::Investigative => 1,
            Code::Artistic => 2,
            Code::Social => 3,
            Code::Enterprising => 4,
            Code::Conventional => 5,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Code::Realistic => 'r',
            Code::Investigative => 'i',
            Code::Artistic => 'a',
            Code::Social => 's',
            Code::Enterprising => 'e',
            Code::Conventional => 'c',
        }
    }

    const fn at(idx: usize) -> Code {
        Self::ALL[idx % 6]
    }

    /// The two hexagon neighbors, counter-clockwise then clockwise.
    pub const fn neighbors(self) -> (Code, Code) {
        let i = self.index();
        (Self::at(i + 5), Self::at(i + 1))
    }

    /// The code directly across the hexagon (distance 3).
    pub const fn opposite(self) -> Code {
        Self::at(self.index() + 3)
    }

    /// Cyclic hexagon distance, 0..=3.
    pub const fn distance(self, other: Code) -> u8 {
        let diff = (self.index() + 6 - other.index()) % 6;
        let wrapped = 6 - diff;
        if diff < wrapped {
            diff as u8
        } else {
            wrapped as u8
        }
    }

    pub const fn is_adjacent_to(self, other: Code) -> bool {
        self.distance(other) == 1
    }

    pub const fn is_opposite_of(self, other: Code) -> bool {
        self.distance(other) == 3
    }

    pub fn from_letter(letter: char) -> Option<Code> {
        match letter.to_ascii_lowercase() {
            'r' => Some(Code::Realistic),
            'i' => Some(Code::Investigative),
            'a' => Some(Code::Artistic),
            's' => Some(Code::Social),
            'e' => Some(Code::Enterprising),
            'c' => Some(Code::Conventional),
            _ => None,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<char> for Code {
    type Error = CoreError;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Code::from_letter(letter)
            .ok_or_else(|| CoreError::InvalidParameter(format!("unknown code letter: {}", letter)))
    }
}

impl FromStr for Code {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Code::from_letter(letter)
                .ok_or_else(|| CoreError::InvalidParameter(format!("unknown code letter: {}", s))),
            _ => Err(CoreError::InvalidParameter(format!(
                "expected a single code letter, got: {}",
                s
            ))),
        }
    }
}
