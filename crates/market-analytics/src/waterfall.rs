//! Incremental-opportunity waterfall.

use crate::dataset::Metric;
use crate::metrics::year_totals;
use market_core::MarketRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BASE_YEAR: u16 = 2024;
pub const HORIZON_YEAR: u16 = 2031;
/// Market value the default increments are calibrated against.
pub const DEFAULT_BASE_VALUE: f64 = 1.0e9;
/// Increments for 2025..=2031 at [`DEFAULT_BASE_VALUE`].
pub const DEFAULT_INCREMENTS: [f64; 7] = [4.2e7, 4.6e7, 5.1e7, 5.5e7, 6.0e7, 6.4e7, 6.9e7];

/// Years and fallback table of a waterfall.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaterfallConfig {
    pub base_year: u16,
    /// Last year with an increment step.
    pub horizon_year: u16,
    pub default_base_value: f64,
    /// One entry per increment year; the last entry repeats when short.
    pub default_increments: Vec<f64>,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            base_year: BASE_YEAR,
            horizon_year: HORIZON_YEAR,
            default_base_value: DEFAULT_BASE_VALUE,
            default_increments: DEFAULT_INCREMENTS.to_vec(),
        }
    }
}

impl WaterfallConfig {
    fn default_increment(&self, index: usize) -> f64 {
        self.default_increments
            .get(index)
            .or_else(|| self.default_increments.last())
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Base,
    Increment,
    Total,
}

/// One bar of the waterfall. Increments float from `start` to `end`; the
/// base and total bars start at 0.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallStep {
    pub year: u16,
    pub kind: StepKind,
    pub value: f64,
    pub start: f64,
    pub end: f64,
    /// Value comes from the default table rather than the records.
    pub estimated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waterfall {
    pub series: Vec<WaterfallStep>,
    pub total_incremental_opportunity: f64,
}

/// Base market value, per-year increments through the horizon and the
/// closing total. Increments touching a year with no market value come from
/// the default table scaled to the computed base, or unscaled when the base
/// itself is 0.
pub fn compute_waterfall(records: &[MarketRecord], config: &WaterfallConfig) -> Waterfall {
    let totals = year_totals(records, Metric::MarketValue, |_| true);
    let total_of = |year: u16| totals.get(&year).copied().unwrap_or(0.0);

    let computed_base = total_of(config.base_year);
    let base_estimated = computed_base <= 0.0;
    let (base_value, scale) = if base_estimated {
        (config.default_base_value, 1.0)
    } else if config.default_base_value > 0.0 {
        (computed_base, computed_base / config.default_base_value)
    } else {
        (computed_base, 1.0)
    };

    let mut series = vec![WaterfallStep {
        year: config.base_year,
        kind: StepKind::Base,
        value: base_value,
        start: 0.0,
        end: base_value,
        estimated: base_estimated,
    }];

    let mut running = base_value;
    let mut estimated_steps = 0usize;
    for (index, year) in (config.base_year.saturating_add(1)..=config.horizon_year).enumerate() {
        let previous = total_of(year - 1);
        let current = total_of(year);
        let (value, estimated) = if previous > 0.0 && current > 0.0 {
            (current - previous, false)
        } else {
            (config.default_increment(index) * scale, true)
        };
        estimated_steps += usize::from(estimated);
        series.push(WaterfallStep {
            year,
            kind: StepKind::Increment,
            value,
            start: running,
            end: running + value,
            estimated,
        });
        running += value;
    }

    series.push(WaterfallStep {
        year: config.horizon_year.saturating_add(1),
        kind: StepKind::Total,
        value: running,
        start: 0.0,
        end: running,
        estimated: base_estimated || estimated_steps > 0,
    });

    debug!(
        base = base_value,
        base_estimated,
        estimated_steps,
        total = running,
        "waterfall computed"
    );
    Waterfall {
        series,
        total_incremental_opportunity: running - base_value,
    }
}
