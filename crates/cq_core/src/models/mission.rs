use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::code::Code;
use crate::models::pair::CodePair;

/// The only input the engine accepts while a mission is on screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OptionKey {
    #[serde(rename = "a")]
    A,
    #[serde(rename = "b")]
    B,
}

impl OptionKey {
    pub fn flipped(self) -> OptionKey {
        match self {
            OptionKey::A => OptionKey::B,
            OptionKey::B => OptionKey::A,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptionKey::A => write!(f, "a"),
            OptionKey::B => write!(f, "b"),
        }
    }
}

impl FromStr for OptionKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "A" => Ok(OptionKey::A),
            "b" | "B" => Ok(OptionKey::B),
            other => Err(CoreError::InvalidParameter(format!(
                "expected option key a or b, got: {}",
                other
            ))),
        }
    }
}

/// One side of a binary mission. Carries exactly what the engine and the
/// presentation shell need; authored extras in the content JSON are ignored
/// on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionOption {
    pub code: Code,
    pub asset: String,
    pub tooltip: String,
}

/// One scripted choice in the fixed main sequence. Every pick scores one
/// point for the chosen option's code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MainMission {
    pub id: String,
    pub task: String,
    pub option_a: MissionOption,
    pub option_b: MissionOption,
}

impl MainMission {
    pub fn option(&self, key: OptionKey) -> &MissionOption {
        match key {
            OptionKey::A => &self.option_a,
            OptionKey::B => &self.option_b,
        }
    }
}

/// A scripted head-to-head between the two codes of one pair. The winner
/// is the chosen option's own code; catalog validation guarantees the side
/// codes agree with the pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TieMission {
    pub id: String,
    pub pair: CodePair,
    pub task: String,
    pub side_a: MissionOption,
    pub side_b: MissionOption,
}

impl TieMission {
    pub fn option(&self, key: OptionKey) -> &MissionOption {
        match key {
            OptionKey::A => &self.side_a,
            OptionKey::B => &self.side_b,
        }
    }

    /// Chosen option first, rejected option second.
    pub fn split(&self, key: OptionKey) -> (&MissionOption, &MissionOption) {
        (self.option(key), self.option(key.flipped()))
    }
}
