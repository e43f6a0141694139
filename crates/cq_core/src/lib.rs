//! # cq_core - Career Path Assessment Game Engine
//!
//! This library provides the deterministic engine behind a
//! choose-your-own-path career assessment: avatar pick, a scripted
//! mission sequence, head-to-head tie-break resolution, and a ranked
//! three-code result, with a JSON API for easy integration with web
//! and desktop shells.
//!
//! ## Features
//! - 100% deterministic resolution (same picks = same ranking)
//! - Head-to-head tie-break tournament with a full audit trace
//! - Embedded Hebrew content catalog plus packed-artifact loading
//! - JSON API for easy integration

// Large enum variants - boxing would require API changes
#![allow(clippy::large_enum_variant)]

pub mod api;
pub mod catalog;
pub mod error;
pub mod models;
pub mod scoring;
pub mod session;
pub mod tournament;

// Re-export main API functions
pub use api::{
    process_session_command_json, session_snapshot_json, AnalysisReport, AnalysisSink, LogSink,
};

// Re-export content loading
pub use catalog::{CatalogError, ContentCatalog};

// Re-export core game types
pub use error::{CoreError, Result};
pub use models::{Code, CodePair, Lead, OptionKey, ScoreTable};
pub use session::{GamePhase, GameSession, RunSummary};
pub use tournament::{Rank, RankResolver, ResolutionPhase, TournamentError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
