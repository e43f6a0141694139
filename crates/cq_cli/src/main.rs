//! Developer CLI
//!
//! Plays a full assessment run in the terminal and drives the
//! tie-resolution core directly from a raw score table for debugging.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use cq_core::catalog::{self, ContentCatalog};
use cq_core::models::{Code, Lead, OptionKey, ScoreTable};
use cq_core::session::{GamePhase, GameSession};
use cq_core::tournament::{RankResolver, ResolutionUpdate};

#[derive(Parser)]
#[command(name = "cq_cli")]
#[command(about = "Career assessment developer tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a full run in the terminal
    Play {
        /// Content JSON overriding the default catalog
        #[arg(long)]
        content: Option<PathBuf>,
    },

    /// Run tie resolution directly from a raw score table
    Resolve {
        /// Score table, e.g. r=3,i=3,a=1,s=1,e=1,c=1
        #[arg(long)]
        table: String,

        /// Option keys consumed in order when ties come up, e.g. ab
        #[arg(long, default_value = "")]
        choices: String,

        /// Print the outcome as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play { content } => play(content.as_deref()),
        Commands::Resolve {
            table,
            choices,
            json,
        } => resolve(&table, &choices, json),
    }
}

fn load_catalog(content: Option<&Path>) -> Result<ContentCatalog> {
    match content {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read content JSON: {}", path.display()))?;
            let catalog = ContentCatalog::from_json_str(&json)?;
            catalog.ensure_valid()?;
            Ok(catalog)
        }
        None => Ok(catalog::load_default()?),
    }
}

fn play(content: Option<&Path>) -> Result<()> {
    let catalog = Arc::new(load_catalog(content)?);
    let mut session = GameSession::new(Arc::clone(&catalog));
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        match session.phase() {
            GamePhase::AvatarSelect => {
                println!("Pick a character:");
                for (n, avatar) in catalog.avatars.iter().enumerate() {
                    println!("  {}. {}", n + 1, avatar.name);
                }
                let line = read_line(&mut input, "> ")?;
                let Some(avatar) = line
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| catalog.avatars.get(n.wrapping_sub(1)))
                else {
                    println!("Enter a number between 1 and {}.", catalog.avatars.len());
                    continue;
                };
                session.choose_avatar(&avatar.id)?;
            }
            GamePhase::Intro => {
                println!("\n{}", catalog.intro.title);
                println!("{}\n", catalog.intro.body);
                read_line(&mut input, "Press Enter to begin ")?;
                session.begin()?;
            }
            GamePhase::MainMissions { .. } => {
                let mission = session
                    .current_main_mission()
                    .context("main phase without a mission")?;
                let (answered, total) = session.main_progress();
                println!("\n[{}/{}] {}", answered + 1, total, mission.task);
                println!("  a) {}", mission.option_a.tooltip);
                println!("  b) {}", mission.option_b.tooltip);
                let key = read_key(&mut input)?;
                session.choose(key)?;
            }
            GamePhase::TieBreak => {
                let mission = session
                    .staged_tie_mission()
                    .context("tie phase without a staged mission")?;
                println!("\n{}", mission.task);
                println!("  a) {}", mission.side_a.tooltip);
                println!("  b) {}", mission.side_b.tooltip);
                let key = read_key(&mut input)?;
                session.choose(key)?;
            }
            GamePhase::LeadCapture => {
                println!("\nAlmost there. Leave your details to see the result.");
                let lead = Lead {
                    full_name: read_line(&mut input, "Full name: ")?,
                    phone: read_line(&mut input, "Phone: ")?,
                    email: read_line(&mut input, "Email: ")?,
                };
                if let Err(err) = session.submit_lead(lead) {
                    println!("  {}", err);
                }
            }
            GamePhase::Summary => {
                print_summary(&session)?;
                return Ok(());
            }
            GamePhase::Failed => {
                let failure = session
                    .failure()
                    .map(|err| err.to_string())
                    .unwrap_or_else(|| "unknown failure".to_string());
                bail!("run failed: {}", failure);
            }
        }
    }
}

fn print_summary(session: &GameSession) -> Result<()> {
    let summary = session.summary()?;
    println!("\nYour top directions:");
    for entry in &summary.ranked {
        println!(
            "  {}. {} [{}]  {} pts",
            entry.rank, entry.title, entry.code, entry.display_score
        );
        if !entry.careers.is_empty() {
            println!("     careers: {}", entry.careers.join(", "));
        }
    }
    if !summary.trace.is_empty() {
        println!("\nTie-breaks you decided: {}", summary.trace.len());
    }
    Ok(())
}

fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

fn read_key(input: &mut impl BufRead) -> Result<OptionKey> {
    loop {
        let line = read_line(input, "> ")?;
        match line.parse::<OptionKey>() {
            Ok(key) => return Ok(key),
            Err(_) => println!("Enter a or b."),
        }
    }
}

fn parse_table(spec: &str) -> Result<ScoreTable> {
    let mut table = ScoreTable::new();
    let mut seen = Vec::new();
    for entry in spec.split(',').filter(|entry| !entry.trim().is_empty()) {
        let (letter, value) = entry
            .split_once('=')
            .with_context(|| format!("expected code=value, got: {}", entry))?;
        let code = letter
            .trim()
            .parse::<Code>()
            .with_context(|| format!("bad code in table entry: {}", entry))?;
        let value: u32 = value
            .trim()
            .parse()
            .with_context(|| format!("bad value in table entry: {}", entry))?;
        if seen.contains(&code) {
            bail!("code {} given twice in --table", code);
        }
        seen.push(code);
        table.set(code, value);
    }
    Ok(table)
}

fn resolve(table_spec: &str, choices: &str, as_json: bool) -> Result<()> {
    let table = parse_table(table_spec)?;
    let catalog = catalog::load_default()?;
    let mut resolver = RankResolver::new(table);

    let mut script = choices.chars();
    let mut update = resolver.start(&catalog)?;
    loop {
        let (rank, mission_id) = match &update {
            ResolutionUpdate::Complete { .. } => break,
            ResolutionUpdate::AwaitingChoice { rank, mission } => (*rank, mission.id.clone()),
        };
        let Some(next) = script.next() else {
            bail!(
                "choice script ran out while rank {} mission '{}' is staged",
                rank.number(),
                mission_id
            );
        };
        let key = next
            .to_string()
            .parse::<OptionKey>()
            .with_context(|| format!("bad choice '{}' in script", next))?;
        debug!(mission = %mission_id, key = %key, "applying scripted choice");
        update = resolver.submit_choice(key, &catalog)?;
    }
    let leftover = script.count();
    if leftover > 0 {
        eprintln!("note: {} scripted choice(s) left unused", leftover);
    }

    if as_json {
        let out = serde_json::json!({
            "phase": resolver.phase(),
            "ranks": resolver.ranks(),
            "trace": resolver.trace(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Ranks:");
    for (n, code) in resolver
        .ranks()
        .as_complete()
        .context("resolution finished without three ranks")?
        .iter()
        .enumerate()
    {
        println!("  {}. {}", n + 1, code);
    }
    if resolver.trace().is_empty() {
        println!("No tie-breaks were needed.");
    } else {
        println!("Decisions:");
        for comparison in resolver.trace() {
            println!(
                "  rank {} via '{}': {} over {} (mission {})",
                comparison.rank.number(),
                comparison.pair.key(),
                comparison.winner,
                comparison.loser,
                comparison.mission_id
            );
        }
    }
    Ok(())
}
