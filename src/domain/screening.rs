//! End-of-day screening filter.
//!
//! Applies four independent range predicates over one cross-sectional
//! snapshot and returns the intersection. Closed world: a row whose field
//! is missing or was unparseable fails that predicate, it is never treated
//! as a wildcard.

use serde::{Deserialize, Serialize};

/// One symbol's row in the cross-sectional snapshot. Numeric fields are
/// `None` when the provider omitted them or sent something unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub code: String,
    pub name: String,
    pub price: Option<f64>,
    pub pct_change: Option<f64>,
    pub turnover_pct: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub market_cap_billions: Option<f64>,
}

/// The four closed numeric ranges; immutable for one screening pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningCriteria {
    pub pct_change_min: f64,
    pub pct_change_max: f64,
    pub turnover_min: f64,
    pub turnover_max: f64,
    pub volume_ratio_min: f64,
    pub market_cap_min_billions: f64,
    pub market_cap_max_billions: f64,
}

impl Default for ScreeningCriteria {
    fn default() -> Self {
        ScreeningCriteria {
            pct_change_min: 2.0,
            pct_change_max: 5.0,
            turnover_min: 4.0,
            turnover_max: 10.0,
            volume_ratio_min: 1.0,
            market_cap_min_billions: 50.0,
            market_cap_max_billions: 200.0,
        }
    }
}

impl ScreeningCriteria {
    pub fn pct_change_passes(&self, row: &SnapshotRow) -> bool {
        row.pct_change
            .is_some_and(|v| v >= self.pct_change_min && v <= self.pct_change_max)
    }

    pub fn turnover_passes(&self, row: &SnapshotRow) -> bool {
        row.turnover_pct
            .is_some_and(|v| v >= self.turnover_min && v <= self.turnover_max)
    }

    pub fn volume_ratio_passes(&self, row: &SnapshotRow) -> bool {
        row.volume_ratio.is_some_and(|v| v > self.volume_ratio_min)
    }

    pub fn market_cap_passes(&self, row: &SnapshotRow) -> bool {
        row.market_cap_billions.is_some_and(|v| {
            v >= self.market_cap_min_billions && v <= self.market_cap_max_billions
        })
    }
}

/// How many rows passed each predicate individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PredicateCounts {
    pub pct_change: usize,
    pub turnover: usize,
    pub volume_ratio: usize,
    pub market_cap: usize,
}

#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub passed: Vec<SnapshotRow>,
    pub counts: PredicateCounts,
    pub scanned: usize,
}

/// Pure filter pass: a row survives only when all four predicates hold.
pub fn screen(rows: &[SnapshotRow], criteria: &ScreeningCriteria) -> ScreeningOutcome {
    let mut counts = PredicateCounts::default();
    let mut passed = Vec::new();

    for row in rows {
        let pct = criteria.pct_change_passes(row);
        let turnover = criteria.turnover_passes(row);
        let volume = criteria.volume_ratio_passes(row);
        let cap = criteria.market_cap_passes(row);

        counts.pct_change += pct as usize;
        counts.turnover += turnover as usize;
        counts.volume_ratio += volume as usize;
        counts.market_cap += cap as usize;

        if pct && turnover && volume && cap {
            passed.push(row.clone());
        }
    }

    ScreeningOutcome {
        passed,
        counts,
        scanned: rows.len(),
    }
}
