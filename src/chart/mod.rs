//! Chart-ready series and plain-text rendering.

pub mod histogram;

pub use histogram::Histogram;

use crate::data::{ParticipantTable, TreatmentArm};
use crate::error::Result;
use crate::profile::ArmRates;
use serde::{Deserialize, Serialize};

/// Default number of bins for the age histograms.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Width of the longest bar in text rendering.
const BAR_WIDTH: usize = 40;

/// One labelled bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Labelled bar values, e.g. adverse-effect rate per arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Bar series of adverse-effect rates, Drug first.
    pub fn adverse_rates(rates: &ArmRates) -> Self {
        Self {
            title: "Proportion with Adverse Effects".to_string(),
            y_label: "% with Side Effects".to_string(),
            bars: TreatmentArm::ALL
                .iter()
                .map(|&arm| Bar {
                    label: arm.label().to_string(),
                    value: rates.get(arm),
                })
                .collect(),
        }
    }
}

/// Age histograms for both arms with a shared bin count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeHistograms {
    pub bins: usize,
    pub drug: Histogram,
    pub placebo: Histogram,
}

impl AgeHistograms {
    /// Bin each arm's ages over that arm's own range.
    pub fn from_table(table: &ParticipantTable, bins: usize) -> Result<Self> {
        Ok(Self {
            bins,
            drug: Histogram::from_values(&table.ages(TreatmentArm::Drug), bins)?,
            placebo: Histogram::from_values(&table.ages(TreatmentArm::Placebo), bins)?,
        })
    }

    /// Histogram for one arm.
    pub fn get(&self, arm: TreatmentArm) -> &Histogram {
        match arm {
            TreatmentArm::Drug => &self.drug,
            TreatmentArm::Placebo => &self.placebo,
        }
    }
}

/// Render a bar series as text, one line per bar, scaled to the largest value.
pub fn render_bars(series: &BarSeries) -> String {
    let max = series
        .bars
        .iter()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    let label_width = series.bars.iter().map(|b| b.label.len()).max().unwrap_or(0);

    let mut out = format!("{}\n", series.title);
    for bar in &series.bars {
        let len = if max > 0.0 && bar.value.is_finite() {
            ((bar.value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {:<width$} |{} {:.3}\n",
            bar.label,
            "#".repeat(len),
            bar.value,
            width = label_width
        ));
    }
    out
}

/// Render a histogram as text, one line per bin.
pub fn render_histogram(title: &str, hist: &Histogram) -> String {
    let max = hist.counts.iter().copied().max().unwrap_or(0);
    let mut out = format!("{}\n", title);
    for (i, &count) in hist.counts.iter().enumerate() {
        let len = if max > 0 {
            (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  [{:>6.1}, {:>6.1}) |{} {}\n",
            hist.edges[i],
            hist.edges[i + 1],
            "#".repeat(len),
            count
        ));
    }
    out
}
