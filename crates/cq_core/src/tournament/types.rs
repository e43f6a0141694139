use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Code, CodePair, TieMission};

/// Rank being contested. Only the first two ever reach the tournament
/// engine; the third is always settled by scoring math.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    First,
    Second,
    Third,
}

impl Rank {
    pub const fn number(self) -> u8 {
        match self {
            Rank::First => 1,
            Rank::Second => 2,
            Rank::Third => 3,
        }
    }

    pub const fn next(self) -> Option<Rank> {
        match self {
            Rank::First => Some(Rank::Second),
            Rank::Second => Some(Rank::Third),
            Rank::Third => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One decided head-to-head, appended to the run trace in order. `seq` is
/// the deterministic ordinal; `decided_at` is wall-clock telemetry and
/// carries no ordering weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TournamentComparison {
    pub seq: u32,
    pub rank: Rank,
    pub pair: CodePair,
    pub mission_id: String,
    pub winner: Code,
    pub loser: Code,
    pub decided_at: DateTime<Utc>,
}

impl TournamentComparison {
    /// Equality over everything except the wall-clock stamp.
    pub fn same_decision(&self, other: &TournamentComparison) -> bool {
        self.seq == other.seq
            && self.rank == other.rank
            && self.pair == other.pair
            && self.mission_id == other.mission_id
            && self.winner == other.winner
            && self.loser == other.loser
    }
}

/// The three ranks as they fill in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResolvedRanks {
    pub rank1: Option<Code>,
    pub rank2: Option<Code>,
    pub rank3: Option<Code>,
}

impl ResolvedRanks {
    pub fn assign(&mut self, rank: Rank, code: Code) {
        match rank {
            Rank::First => self.rank1 = Some(code),
            Rank::Second => self.rank2 = Some(code),
            Rank::Third => self.rank3 = Some(code),
        }
    }

    pub fn get(&self, rank: Rank) -> Option<Code> {
        match rank {
            Rank::First => self.rank1,
            Rank::Second => self.rank2,
            Rank::Third => self.rank3,
        }
    }

    /// Codes already holding a rank, for selector exclusion lists.
    pub fn assigned(&self) -> Vec<Code> {
        [self.rank1, self.rank2, self.rank3]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn contains(&self, code: Code) -> bool {
        self.assigned().contains(&code)
    }

    pub fn is_complete(&self) -> bool {
        self.rank1.is_some() && self.rank2.is_some() && self.rank3.is_some()
    }

    pub fn as_complete(&self) -> Option<[Code; 3]> {
        match (self.rank1, self.rank2, self.rank3) {
            (Some(first), Some(second), Some(third)) => Some([first, second, third]),
            _ => None,
        }
    }
}

/// Externally observable resolution phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum ResolutionPhase {
    /// Created but not yet started.
    Pending,
    /// A tie mission is staged; the next transition needs an option key.
    AwaitingChoice { rank: Rank },
    Complete,
    Failed,
}

impl fmt::Display for ResolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolutionPhase::Pending => write!(f, "pending"),
            ResolutionPhase::AwaitingChoice { rank } => write!(f, "awaiting-choice(rank {rank})"),
            ResolutionPhase::Complete => write!(f, "complete"),
            ResolutionPhase::Failed => write!(f, "failed"),
        }
    }
}

/// What a successful transition hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionUpdate {
    /// Render this mission and come back with an option key.
    AwaitingChoice { rank: Rank, mission: TieMission },
    /// All three ranks are assigned.
    Complete { ranks: [Code; 3] },
}
