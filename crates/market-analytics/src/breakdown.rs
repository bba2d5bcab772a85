//! Country split within each region.

use crate::AnalyticsError;
use market_core::{MarketRecord, Region};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// What a breakdown reports per country.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationMode {
    /// Percentage share of the region's market value.
    #[default]
    Value,
    /// Raw summed volume.
    Volume,
}

impl FromStr for EvaluationMode {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "value" => Ok(EvaluationMode::Value),
            "volume" => Ok(EvaluationMode::Volume),
            _ => Err(AnalyticsError::UnknownMode(s.to_string())),
        }
    }
}

/// One (year, region) row of the breakdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionBreakdown {
    pub year: u16,
    pub region: Region,
    /// Every country seen in the region, in any year.
    pub countries: BTreeMap<String, f64>,
}

/// Per (year, region), each country's share of the region's year total in
/// percent, or its summed volume. A zero region total yields 0 for every
/// country.
pub fn region_country_breakdown(
    records: &[MarketRecord],
    mode: EvaluationMode,
) -> Vec<RegionBreakdown> {
    let mut sums: BTreeMap<(u16, Region), BTreeMap<&'static str, f64>> = BTreeMap::new();
    let mut countries: BTreeMap<Region, BTreeSet<&'static str>> = BTreeMap::new();
    let mut years: BTreeSet<u16> = BTreeSet::new();

    for r in records {
        let value = match mode {
            EvaluationMode::Value => r.market_value_usd,
            EvaluationMode::Volume => r.volume_units as f64,
        };
        *sums
            .entry((r.year, r.region))
            .or_default()
            .entry(r.country)
            .or_insert(0.0) += value;
        countries.entry(r.region).or_default().insert(r.country);
        years.insert(r.year);
    }

    let mut rows = Vec::with_capacity(years.len() * countries.len());
    for &year in &years {
        for (&region, names) in &countries {
            let by_country = sums.get(&(year, region));
            let raw = |name: &str| {
                by_country
                    .and_then(|m| m.get(name))
                    .copied()
                    .unwrap_or(0.0)
            };
            let total: f64 = names.iter().map(|&n| raw(n)).sum();
            let shares = names
                .iter()
                .map(|&name| {
                    let value = match mode {
                        EvaluationMode::Volume => raw(name),
                        EvaluationMode::Value if total > 0.0 => raw(name) / total * 100.0,
                        EvaluationMode::Value => 0.0,
                    };
                    (name.to_string(), value)
                })
                .collect();
            rows.push(RegionBreakdown {
                year,
                region,
                countries: shares,
            });
        }
    }
    rows
}
