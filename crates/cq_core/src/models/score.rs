use serde::{Deserialize, Serialize};

use crate::models::code::Code;

/// Per-code tally of main-mission picks. Each pick adds exactly one point
/// to the chosen option's code; the tie-break stage reads the table but
/// never writes it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScoreTableWire", into = "ScoreTableWire")]
pub struct ScoreTable {
    counts: [u32; 6],
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: Code) -> u32 {
        self.counts[code.index()]
    }

    pub fn record(&mut self, code: Code) {
        self.counts[code.index()] += 1;
    }

    pub fn set(&mut self, code: Code, value: u32) {
        self.counts[code.index()] = value;
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Pairs in hexagon order.
    pub fn iter(&self) -> impl Iterator<Item = (Code, u32)> + '_ {
        Code::ALL.iter().map(move |&code| (code, self.get(code)))
    }

    /// Copy of the table with per-rank display bonuses added. Presentation
    /// data only; ranking math always runs on the raw table.
    pub fn bonus_adjusted(&self, ranked: [Code; 3], bonus: [u32; 3]) -> ScoreTable {
        let mut adjusted = self.clone();
        for (code, extra) in ranked.into_iter().zip(bonus) {
            adjusted.counts[code.index()] += extra;
        }
        adjusted
    }
}

impl FromIterator<(Code, u32)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (Code, u32)>>(iter: I) -> Self {
        let mut table = ScoreTable::new();
        for (code, value) in iter {
            table.set(code, value);
        }
        table
    }
}

#[derive(Serialize, Deserialize)]
struct ScoreTableWire {
    r: u32,
    i: u32,
    a: u32,
    s: u32,
    e: u32,
    c: u32,
}

impl From<ScoreTableWire> for ScoreTable {
    fn from(wire: ScoreTableWire) -> Self {
        ScoreTable {
            counts: [wire.r, wire.i, wire.a, wire.s, wire.e, wire.c],
        }
    }
}

impl From<ScoreTable> for ScoreTableWire {
    fn from(table: ScoreTable) -> Self {
        let [r, i, a, s, e, c] = table.counts;
        ScoreTableWire { r, i, a, s, e, c }
    }
}
