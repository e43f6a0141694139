//! Deterministic tie-break resolution.
//!
//! When the main missions leave two or more codes tied, the resolver
//! stages head-to-head tie missions and lets the player's own choices
//! settle the first and second ranks. The third rank is always derived
//! from scoring math. Same table in, same choices in, same ranks and
//! trace out.

pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod pairing;
pub mod types;

pub use engine::{RankTournament, RoundOutcome, RoundReport};
pub use error::TournamentError;
pub use orchestrator::RankResolver;
pub use pairing::ranked_pairs;
pub use types::{Rank, ResolutionPhase, ResolutionUpdate, ResolvedRanks, TournamentComparison};
