//! Cross-tabulation of treatment arm against adverse-effect count.

use crate::data::arm::{AdverseEvent, TreatmentArm};
use crate::data::participant::ParticipantTable;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Number of effect-count columns (0 through 5 inclusive).
pub const EFFECT_COUNT_LEVELS: usize = AdverseEvent::COUNT + 1;

/// Arm × effect-count table of participant counts.
///
/// Rows follow [`TreatmentArm::ALL`], columns are effect counts 0..=5.
/// All six columns are always present, including empty ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Observed counts (2 × 6).
    pub counts: DMatrix<f64>,
    /// Row labels.
    pub arms: Vec<TreatmentArm>,
    /// Column labels (effect counts).
    pub effect_counts: Vec<usize>,
}

impl ContingencyTable {
    /// Build the table from aggregated participants.
    pub fn from_participants(table: &ParticipantTable) -> Self {
        let mut counts = DMatrix::<f64>::zeros(TreatmentArm::ALL.len(), EFFECT_COUNT_LEVELS);
        for p in table.iter() {
            // recount from flags so the column is always in 0..=5
            let level = p.flags.iter().filter(|&&f| f).count();
            counts[(p.arm.index(), level)] += 1.0;
        }
        Self {
            counts,
            arms: TreatmentArm::ALL.to_vec(),
            effect_counts: (0..EFFECT_COUNT_LEVELS).collect(),
        }
    }

    /// Build directly from a row-major count array (Drug row first).
    pub fn from_counts(rows: [[u64; EFFECT_COUNT_LEVELS]; 2]) -> Self {
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().map(|&c| c as f64)).collect();
        Self {
            counts: DMatrix::from_row_slice(2, EFFECT_COUNT_LEVELS, &flat),
            arms: TreatmentArm::ALL.to_vec(),
            effect_counts: (0..EFFECT_COUNT_LEVELS).collect(),
        }
    }

    /// Count for one cell, `None` for an effect count above 5.
    pub fn get(&self, arm: TreatmentArm, effect_count: usize) -> Option<u64> {
        self.counts
            .get((arm.index(), effect_count))
            .map(|&c| c as u64)
    }

    /// Row totals (participants per arm).
    pub fn row_totals(&self) -> Vec<f64> {
        self.counts.row_iter().map(|r| r.sum()).collect()
    }

    /// Column totals (participants per effect count).
    pub fn column_totals(&self) -> Vec<f64> {
        self.counts.column_iter().map(|c| c.sum()).collect()
    }

    /// Grand total.
    pub fn total(&self) -> f64 {
        self.counts.sum()
    }

    /// Indices of columns with at least one participant.
    pub fn observed_columns(&self) -> Vec<usize> {
        self.column_totals()
            .iter()
            .enumerate()
            .filter(|(_, &t)| t > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Render as a TSV block (header plus one row per arm).
    pub fn to_tsv_string(&self) -> String {
        let header: Vec<String> = self.effect_counts.iter().map(|c| c.to_string()).collect();
        let mut out = format!("trx\t{}\n", header.join("\t"));
        for (r, arm) in self.arms.iter().enumerate() {
            let cells: Vec<String> = (0..self.counts.ncols())
                .map(|c| format!("{}", self.counts[(r, c)] as u64))
                .collect();
            out.push_str(&format!("{}\t{}\n", arm, cells.join("\t")));
        }
        out
    }
}

impl std::fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {:<12}", "num_effects")?;
        for c in &self.effect_counts {
            write!(f, "{:>6}", c)?;
        }
        writeln!(f)?;
        for (r, arm) in self.arms.iter().enumerate() {
            write!(f, "  {:<12}", arm.label())?;
            for c in 0..self.counts.ncols() {
                write!(f, "{:>6}", self.counts[(r, c)] as u64)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
