//! Growth ratios and shared per-year totals.

use crate::dataset::Metric;
use market_core::MarketRecord;
use std::collections::BTreeMap;

/// Lower bound of the substitute opportunity band.
pub const ESTIMATED_OPPORTUNITY_MIN: f64 = 250.0;
/// Upper bound of the substitute opportunity band.
pub const ESTIMATED_OPPORTUNITY_MAX: f64 = 650.0;

/// Compound annual growth rate as a fraction.
///
/// Returns 0 unless both endpoints and the span are positive; never NaN or
/// infinite.
pub fn compute_cagr(start: f64, end: f64, years: f64) -> f64 {
    if !(start > 0.0 && end > 0.0 && years > 0.0) {
        return 0.0;
    }
    let rate = (end / start).powf(years.recip()) - 1.0;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}

/// Year-over-year change as a fraction; 0 when `previous` is not positive.
pub fn compute_yoy(current: f64, previous: f64) -> f64 {
    if !(previous > 0.0 && current.is_finite() && previous.is_finite()) {
        return 0.0;
    }
    (current - previous) / previous
}

/// Stable substitute opportunity for `label` in
/// `[ESTIMATED_OPPORTUNITY_MIN, ESTIMATED_OPPORTUNITY_MAX]`.
pub fn label_opportunity(label: &str) -> f64 {
    let hash = label
        .chars()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32));
    let band = (ESTIMATED_OPPORTUNITY_MAX - ESTIMATED_OPPORTUNITY_MIN) as u32 + 1;
    ESTIMATED_OPPORTUNITY_MIN + f64::from(hash.unsigned_abs() % band)
}

/// Sum of `metric` per year over the records admitted by `include`.
pub fn year_totals<F>(records: &[MarketRecord], metric: Metric, include: F) -> BTreeMap<u16, f64>
where
    F: Fn(&MarketRecord) -> bool,
{
    let mut totals = BTreeMap::new();
    for record in records.iter().filter(|r| include(r)) {
        *totals.entry(record.year).or_insert(0.0) += metric.value_of(record);
    }
    totals
}
