//! Per-entity yearly series with year-over-year and compound growth.

use crate::dataset::{Metric, SegmentField};
use crate::entities::resolve_entities;
use crate::metrics::{compute_cagr, compute_yoy};
use crate::AnalyticsError;
use market_core::MarketRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub year: u16,
    pub value: f64,
    /// Change against the previous year in percent; 0 for the first year.
    pub yoy_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSeries {
    pub label: String,
    pub series: Vec<GrowthPoint>,
    /// CAGR between the first and last year of the series, in percent.
    pub cagr_pct: f64,
}

/// Growth series per entity of `group_by`. Every series spans every year
/// present in `records`, with 0 for years the entity has no data.
pub fn compute_yoy_and_cagr(
    records: &[MarketRecord],
    group_by: SegmentField,
    selection: &[String],
    metric: Metric,
) -> Result<Vec<GrowthSeries>, AnalyticsError> {
    let years: BTreeSet<u16> = records.iter().map(|r| r.year).collect();
    let entities = resolve_entities(records, group_by, selection)?;

    let output: Vec<GrowthSeries> = entities
        .iter()
        .map(|entity| {
            let totals = entity.year_totals(records, metric);
            let mut previous: Option<f64> = None;
            let series: Vec<GrowthPoint> = years
                .iter()
                .map(|&year| {
                    let value = totals.get(&year).copied().unwrap_or(0.0);
                    let yoy_pct = previous.map_or(0.0, |p| compute_yoy(value, p) * 100.0);
                    previous = Some(value);
                    GrowthPoint {
                        year,
                        value,
                        yoy_pct,
                    }
                })
                .collect();
            let cagr_pct = match (series.first(), series.last()) {
                (Some(first), Some(last)) => {
                    compute_cagr(first.value, last.value, f64::from(last.year - first.year)) * 100.0
                }
                _ => 0.0,
            };
            GrowthSeries {
                label: entity.label.clone(),
                series,
                cagr_pct,
            }
        })
        .collect();

    debug!(
        %group_by,
        entities = output.len(),
        years = years.len(),
        "growth series computed"
    );
    Ok(output)
}
