//! Row-wise statistics across the experiments of a composed table.
//!
//! Variance uses Welford's running update so a row of nearly equal
//! intensities does not cancel catastrophically. NaN cells are skipped,
//! the same way the dataframe reductions the OceanView tooling relied on
//! behave.

use super::table::{ComposedTable, StatsRow, StatsTable};

// ---------------------------------------------------------------------------
// Welford accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn update(&mut self, x: f64) {
        if x.is_nan() {
            return;
        }
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }
}

// ---------------------------------------------------------------------------
// RowStats
// ---------------------------------------------------------------------------

/// Aggregates of one set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n − 1); NaN with fewer than two values.
    pub std: f64,
}

impl RowStats {
    pub fn from_values(values: &[f64]) -> Self {
        let mut acc = Accumulator::new();
        for &v in values {
            acc.update(v);
        }
        if acc.count == 0 {
            return Self {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std: f64::NAN,
            };
        }
        let std = if acc.count < 2 {
            f64::NAN
        } else {
            (acc.m2 / (acc.count - 1) as f64).max(0.0).sqrt()
        };
        // Welford's mean can drift an ulp outside [min, max].
        let mean = acc.mean.clamp(acc.min, acc.max);
        Self {
            min: acc.min,
            max: acc.max,
            mean,
            std,
        }
    }
}

// ---------------------------------------------------------------------------
// Table-level computation
// ---------------------------------------------------------------------------

/// Build `[Wavelength, min, max, mean, std]` with one row per composed row,
/// in the same order. Pure function of `table`.
pub fn compute(table: &ComposedTable) -> StatsTable {
    let mut stats = StatsTable::with_capacity(table.len());
    let mut row = Vec::with_capacity(table.width());
    for (i, &key) in table.keys().iter().enumerate() {
        row.clear();
        row.extend(table.columns().iter().map(|c| c.values[i]));
        let RowStats { min, max, mean, std } = RowStats::from_values(&row);
        stats.push(StatsRow {
            key,
            min,
            max,
            mean,
            std,
        });
    }
    stats
}
