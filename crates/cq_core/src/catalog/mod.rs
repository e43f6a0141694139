//! Authored game content: avatars, the scripted main-mission sequence, the
//! tie-break mission pool, and per-code summary copy.
//!
//! A [`ContentCatalog`] is built once at startup (embedded JSON, a content
//! file, or the packed artifact produced by `catalog_builder`) and passed
//! by reference into everything that needs it. There is no global catalog.

pub mod cache;
#[cfg(feature = "embedded_catalog")]
pub mod embedded;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Code, CodePair, MainMission, TieMission};

pub use cache::{load_default, load_packed, load_packed_bytes, CATALOG_PATH_ENV};
#[cfg(feature = "embedded_catalog")]
pub use embedded::load_embedded;

/// Selectable player figure shown before the run starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub asset: String,
}

/// Copy for the intro screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntroCopy {
    pub title: String,
    pub body: String,
}

/// Summary-screen copy for one code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeSummary {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub careers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentCatalog {
    #[serde(default)]
    pub schema_version: u8,
    pub avatars: Vec<Avatar>,
    pub intro: IntroCopy,
    pub main_missions: Vec<MainMission>,
    pub tie_missions: HashMap<CodePair, TieMission>,
    pub summaries: HashMap<Code, CodeSummary>,
}

impl ContentCatalog {
    /// Parse a catalog from content JSON. No integrity audit is run here;
    /// call [`ContentCatalog::ensure_valid`] or use one of the load
    /// functions when a vetted catalog is required.
    pub fn from_json_str(json: &str) -> Result<ContentCatalog, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Tie mission authored for this exact pair, if any.
    pub fn tie_mission(&self, pair: CodePair) -> Option<&TieMission> {
        self.tie_missions.get(&pair)
    }

    pub fn avatar(&self, id: &str) -> Option<&Avatar> {
        self.avatars.iter().find(|avatar| avatar.id == id)
    }

    pub fn summary(&self, code: Code) -> Option<&CodeSummary> {
        self.summaries.get(&code)
    }

    /// Full content audit. Returns every issue found; an empty list means
    /// the catalog can back a complete run, whatever ties come up.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        if self.avatars.is_empty() {
            issues.push(CatalogIssue::NoAvatars);
        }
        let mut avatar_ids = HashSet::new();
        for avatar in &self.avatars {
            if !avatar_ids.insert(avatar.id.as_str()) {
                issues.push(CatalogIssue::DuplicateAvatarId {
                    id: avatar.id.clone(),
                });
            }
        }

        if self.main_missions.is_empty() {
            issues.push(CatalogIssue::NoMainMissions);
        }

        let mut mission_ids = HashSet::new();
        for mission in &self.main_missions {
            if !mission_ids.insert(mission.id.as_str()) {
                issues.push(CatalogIssue::DuplicateMissionId {
                    id: mission.id.clone(),
                });
            }
            check_text(&mut issues, &mission.id, "task", &mission.task);
            check_option(&mut issues, &mission.id, "option_a", &mission.option_a);
            check_option(&mut issues, &mission.id, "option_b", &mission.option_b);
        }

        for pair in all_pairs() {
            if !self.tie_missions.contains_key(&pair) {
                issues.push(CatalogIssue::MissingTiePair { key: pair.key() });
            }
        }

        for (key, mission) in &self.tie_missions {
            if !mission_ids.insert(mission.id.as_str()) {
                issues.push(CatalogIssue::DuplicateMissionId {
                    id: mission.id.clone(),
                });
            }
            check_text(&mut issues, &mission.id, "task", &mission.task);
            check_option(&mut issues, &mission.id, "side_a", &mission.side_a);
            check_option(&mut issues, &mission.id, "side_b", &mission.side_b);

            if mission.pair != *key {
                issues.push(CatalogIssue::PairKeyMismatch {
                    key: key.key(),
                    id: mission.id.clone(),
                    declared: mission.pair.key(),
                });
            }
            let covered = CodePair::new(mission.side_a.code, mission.side_b.code);
            if covered != Some(*key) {
                issues.push(CatalogIssue::SideCodesMismatch {
                    key: key.key(),
                    id: mission.id.clone(),
                    found: format!("{}/{}", mission.side_a.code, mission.side_b.code),
                });
            }
        }

        for code in Code::ALL {
            if !self.summaries.contains_key(&code) {
                issues.push(CatalogIssue::MissingSummary { code });
            }
        }

        issues
    }

    /// Audit and fail on any issue.
    pub fn ensure_valid(&self) -> Result<(), CatalogError> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Invalid { issues })
        }
    }
}

/// All 15 unordered code pairs.
pub fn all_pairs() -> Vec<CodePair> {
    let mut pairs = Vec::with_capacity(15);
    for (i, &a) in Code::ALL.iter().enumerate() {
        for &b in &Code::ALL[i + 1..] {
            if let Some(pair) = CodePair::new(a, b) {
                pairs.push(pair);
            }
        }
    }
    pairs
}

fn check_text(issues: &mut Vec<CatalogIssue>, id: &str, field: &'static str, text: &str) {
    if text.trim().is_empty() {
        issues.push(CatalogIssue::EmptyField {
            id: id.to_string(),
            field,
        });
    }
}

fn check_option(
    issues: &mut Vec<CatalogIssue>,
    id: &str,
    side: &'static str,
    option: &crate::models::MissionOption,
) {
    if option.asset.trim().is_empty() {
        issues.push(CatalogIssue::EmptyField {
            id: format!("{}.{}", id, side),
            field: "asset",
        });
    }
    if option.tooltip.trim().is_empty() {
        issues.push(CatalogIssue::EmptyField {
            id: format!("{}.{}", id, side),
            field: "tooltip",
        });
    }
}

/// One defect found by the content audit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogIssue {
    #[error("no avatars authored")]
    NoAvatars,
    #[error("duplicate avatar id '{id}'")]
    DuplicateAvatarId { id: String },
    #[error("no main missions authored")]
    NoMainMissions,
    #[error("duplicate mission id '{id}'")]
    DuplicateMissionId { id: String },
    #[error("mission '{id}' has empty {field}")]
    EmptyField { id: String, field: &'static str },
    #[error("missing tie mission for pair '{key}'")]
    MissingTiePair { key: String },
    #[error("tie mission '{id}' is keyed '{key}' but declares pair '{declared}'")]
    PairKeyMismatch {
        key: String,
        id: String,
        declared: String,
    },
    #[error("tie mission '{id}' sides score {found}, which does not cover pair '{key}'")]
    SideCodesMismatch {
        key: String,
        id: String,
        found: String,
    },
    #[error("missing summary for code '{code}'")]
    MissingSummary { code: Code },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("packed catalog decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("packed catalog decompression failed: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),
    #[error("catalog failed the integrity audit with {} issue(s)", issues.len())]
    Invalid { issues: Vec<CatalogIssue> },
}

impl CatalogError {
    /// Issues from an audit failure, empty for every other error kind.
    pub fn issues(&self) -> &[CatalogIssue] {
        match self {
            CatalogError::Invalid { issues } => issues,
            _ => &[],
        }
    }
}
