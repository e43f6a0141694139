use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::code::Code;

/// Unordered pair of two distinct codes. The canonical key is the two
/// lowercase letters in alphabetical order ("ir", "ac", ...), which is the
/// map key authored content uses. Alphabetical order is a storage detail;
/// tie-breaking between pairs uses the priority order on [`Code`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CodePair {
    low: Code,
    high: Code,
}

impl CodePair {
    /// Builds a normalized pair, or `None` when both codes are the same.
    pub fn new(a: Code, b: Code) -> Option<CodePair> {
        if a == b {
            return None;
        }
        if a.letter() < b.letter() {
            Some(CodePair { low: a, high: b })
        } else {
            Some(CodePair { low: b, high: a })
        }
    }

    /// Members in alphabetical key order.
    pub fn members(self) -> (Code, Code) {
        (self.low, self.high)
    }

    /// Two-letter canonical key, e.g. "ir" for {i, r}.
    pub fn key(self) -> String {
        let mut key = String::with_capacity(2);
        key.push(self.low.letter());
        key.push(self.high.letter());
        key
    }

    /// Member that comes first in the default priority order.
    pub fn priority_lead(self) -> Code {
        if self.low.index() <= self.high.index() {
            self.low
        } else {
            self.high
        }
    }

    /// Member that comes second in the default priority order.
    pub fn priority_tail(self) -> Code {
        if self.low.index() <= self.high.index() {
            self.high
        } else {
            self.low
        }
    }

    pub fn distance(self) -> u8 {
        self.low.distance(self.high)
    }

    pub fn is_opposite(self) -> bool {
        self.distance() == 3
    }

    pub fn contains(self, code: Code) -> bool {
        self.low == code || self.high == code
    }

    /// The other member, or `None` when `code` is not in the pair.
    pub fn other(self, code: Code) -> Option<Code> {
        if code == self.low {
            Some(self.high)
        } else if code == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for CodePair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.low.letter(), self.high.letter())
    }
}

impl From<CodePair> for String {
    fn from(pair: CodePair) -> Self {
        pair.key()
    }
}

impl FromStr for CodePair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(first), Some(second), None) => {
                let a = Code::from_letter(first).ok_or_else(|| {
                    CoreError::InvalidParameter(format!("unknown code letter in pair key: {}", s))
                })?;
                let b = Code::from_letter(second).ok_or_else(|| {
                    CoreError::InvalidParameter(format!("unknown code letter in pair key: {}", s))
                })?;
                CodePair::new(a, b).ok_or_else(|| {
                    CoreError::InvalidParameter(format!("pair key repeats a code: {}", s))
                })
            }
            _ => Err(CoreError::InvalidParameter(format!(
                "expected a two-letter pair key, got: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for CodePair {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
