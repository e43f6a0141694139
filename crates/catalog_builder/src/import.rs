//! Authoring-spreadsheet import.
//!
//! The content team authors missions in two CSVs, one for the main
//! sequence and one for the tie-break pool. Import merges them over a
//! base content JSON (avatars, intro and summaries usually live there)
//! and emits a fresh content JSON for `validate` and `pack`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use cq_core::catalog::{ContentCatalog, IntroCopy};
use cq_core::models::{Code, CodePair, MainMission, MissionOption, TieMission};

/// CSV import statistics
#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    pub missions: u32,
    pub ties: u32,
    pub failed: u32,
}

/// Main-mission CSV row
///
/// Expected columns:
/// `id,task,option_a_code,option_a_asset,option_a_tooltip,option_b_code,option_b_asset,option_b_tooltip`
#[derive(Debug, Deserialize)]
struct MissionRow {
    id: String,
    task: String,
    option_a_code: String,
    option_a_asset: String,
    option_a_tooltip: String,
    option_b_code: String,
    option_b_asset: String,
    option_b_tooltip: String,
}

/// Tie-mission CSV row
///
/// Expected columns:
/// `pair,id,task,side_a_code,side_a_asset,side_a_tooltip,side_b_code,side_b_asset,side_b_tooltip`
#[derive(Debug, Deserialize)]
struct TieRow {
    pair: String,
    id: String,
    task: String,
    side_a_code: String,
    side_a_asset: String,
    side_a_tooltip: String,
    side_b_code: String,
    side_b_asset: String,
    side_b_tooltip: String,
}

/// Build a content catalog from authoring CSVs, merged over an optional
/// base content JSON. Malformed rows are skipped with a warning; run the
/// audit afterwards to decide whether the result is shippable.
pub fn import_content(
    missions_csv: &Path,
    ties_csv: &Path,
    base_json: Option<&Path>,
) -> Result<(ContentCatalog, ImportStats)> {
    let mut catalog = match base_json {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read base JSON: {}", path.display()))?;
            ContentCatalog::from_json_str(&json).context("Failed to parse base JSON")?
        }
        None => empty_catalog(),
    };

    let mut stats = ImportStats::default();
    catalog.main_missions = parse_missions(missions_csv, &mut stats)?;
    catalog.tie_missions = parse_ties(ties_csv, &mut stats)?;

    Ok((catalog, stats))
}

fn empty_catalog() -> ContentCatalog {
    ContentCatalog {
        schema_version: 0,
        avatars: Vec::new(),
        intro: IntroCopy {
            title: String::new(),
            body: String::new(),
        },
        main_missions: Vec::new(),
        tie_missions: HashMap::new(),
        summaries: HashMap::new(),
    }
}

fn parse_code(raw: &str, line: usize, field: &str, stats: &mut ImportStats) -> Option<Code> {
    match raw.trim().parse::<Code>() {
        Ok(code) => Some(code),
        Err(_) => {
            stats.failed += 1;
            eprintln!("Warning: Line {} - Invalid {} value: '{}'", line, field, raw);
            None
        }
    }
}

fn parse_missions(csv_path: &Path, stats: &mut ImportStats) -> Result<Vec<MainMission>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open missions CSV: {}", csv_path.display()))?;

    let mut missions = Vec::new();
    for (n, result) in reader.deserialize::<MissionRow>().enumerate() {
        let line = n + 2; // header is line 1
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                stats.failed += 1;
                eprintln!("Warning: Line {} - {}", line, err);
                continue;
            }
        };
        let Some(code_a) = parse_code(&row.option_a_code, line, "option_a_code", stats) else {
            continue;
        };
        let Some(code_b) = parse_code(&row.option_b_code, line, "option_b_code", stats) else {
            continue;
        };
        missions.push(MainMission {
            id: row.id,
            task: row.task,
            option_a: MissionOption {
                code: code_a,
                asset: row.option_a_asset,
                tooltip: row.option_a_tooltip,
            },
            option_b: MissionOption {
                code: code_b,
                asset: row.option_b_asset,
                tooltip: row.option_b_tooltip,
            },
        });
        stats.missions += 1;
    }
    Ok(missions)
}

fn parse_ties(csv_path: &Path, stats: &mut ImportStats) -> Result<HashMap<CodePair, TieMission>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open ties CSV: {}", csv_path.display()))?;

    let mut ties = HashMap::new();
    for (n, result) in reader.deserialize::<TieRow>().enumerate() {
        let line = n + 2;
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                stats.failed += 1;
                eprintln!("Warning: Line {} - {}", line, err);
                continue;
            }
        };
        let pair = match row.pair.trim().parse::<CodePair>() {
            Ok(pair) => pair,
            Err(_) => {
                stats.failed += 1;
                eprintln!("Warning: Line {} - Invalid pair value: '{}'", line, row.pair);
                continue;
            }
        };
        let Some(code_a) = parse_code(&row.side_a_code, line, "side_a_code", stats) else {
            continue;
        };
        let Some(code_b) = parse_code(&row.side_b_code, line, "side_b_code", stats) else {
            continue;
        };
        if ties.contains_key(&pair) {
            stats.failed += 1;
            eprintln!("Warning: Line {} - Duplicate pair '{}'", line, pair.key());
            continue;
        }
        ties.insert(
            pair,
            TieMission {
                id: row.id,
                pair,
                task: row.task,
                side_a: MissionOption {
                    code: code_a,
                    asset: row.side_a_asset,
                    tooltip: row.side_a_tooltip,
                },
                side_b: MissionOption {
                    code: code_b,
                    asset: row.side_b_asset,
                    tooltip: row.side_b_tooltip,
                },
            },
        );
        stats.ties += 1;
    }
    Ok(ties)
}
