#![deny(warnings)]

//! Core domain model for the market insights dashboard.
//!
//! This crate owns the synthetic dataset: the flat [`MarketRecord`] type,
//! the static category catalogs, the deterministic generator and the
//! host-owned [`RecordStore`] cache, plus validation helpers that guarantee
//! the record invariants downstream aggregations rely on.

pub mod catalog;
pub mod generator;
pub mod lcg;
pub mod record;
pub mod store;

pub use catalog::{
    all_paths, children_of, expand_selection, find_node, leaf_paths, product_hierarchy,
    sales_channel_hierarchy, walk_selected, CategoryNode, CategoryPath,
};
pub use generator::{Generator, DEFAULT_SEED, FIRST_RECORD_ID, FIRST_YEAR, LAST_YEAR};
pub use record::{
    AgeGroup, DistributionChannel, MarketRecord, PriceRange, ProductForm, Profession, Region,
};
pub use store::RecordStore;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Record invariant violations.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("record {record_id}: non-finite {field}")]
    NonFinite { record_id: u64, field: &'static str },
    /// Price or monetary value must be non-negative.
    #[error("record {record_id}: negative {field}")]
    NegativeMoney { record_id: u64, field: &'static str },
    /// Revenue must equal price times volume within rounding.
    #[error("record {record_id}: revenue {revenue} != price x volume {expected}")]
    RevenueMismatch {
        record_id: u64,
        revenue: f64,
        expected: f64,
    },
    /// Market value must stay within 10% of revenue.
    #[error("record {record_id}: market value {market_value} outside 10% of revenue {revenue}")]
    MarketValueOutOfBand {
        record_id: u64,
        market_value: f64,
        revenue: f64,
    },
    /// Generator growth rate must be finite.
    #[error("growth rate {0} is not finite")]
    InvalidGrowthRate(f64),
}

/// Errors turning presentation labels back into typed values.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown {kind}: {value:?}")]
    UnknownLabel { kind: &'static str, value: String },
}

/// Half a cent plus float slack.
const ROUNDING_TOLERANCE: f64 = 0.005 + 1e-6;
/// Allowed spread between market value and revenue.
pub const MARKET_VALUE_BAND: f64 = 0.10;

/// Round to 2 decimal places, midpoint away from zero. Values that cannot be
/// represented as a decimal (NaN, infinities, huge magnitudes) pass through.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Validate a generated record.
pub fn validate_record(r: &MarketRecord) -> Result<(), ValidationError> {
    let fields = [
        ("price", r.price),
        ("revenue", r.revenue),
        ("marketValueUsd", r.market_value_usd),
        ("marketSharePct", r.market_share_pct),
        ("cagr", r.cagr),
        ("yoyGrowth", r.yoy_growth),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                record_id: r.record_id,
                field,
            });
        }
    }
    for (field, value) in [
        ("price", r.price),
        ("revenue", r.revenue),
        ("marketValueUsd", r.market_value_usd),
    ] {
        if value < 0.0 {
            return Err(ValidationError::NegativeMoney {
                record_id: r.record_id,
                field,
            });
        }
    }
    let expected = r.price * r.volume_units as f64;
    if (r.revenue - expected).abs() > ROUNDING_TOLERANCE {
        return Err(ValidationError::RevenueMismatch {
            record_id: r.record_id,
            revenue: r.revenue,
            expected,
        });
    }
    if (r.market_value_usd - r.revenue).abs() > r.revenue * MARKET_VALUE_BAND + ROUNDING_TOLERANCE {
        return Err(ValidationError::MarketValueOutOfBand {
            record_id: r.record_id,
            market_value: r.market_value_usd,
            revenue: r.revenue,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record() -> MarketRecord {
        MarketRecord {
            record_id: FIRST_RECORD_ID,
            year: 2024,
            region: Region::Europe,
            country: "France",
            product_type: CategoryPath::root("Skin Care").child("Serums").unwrap(),
            product_form: ProductForm::Liquid,
            price_range: PriceRange::Premium,
            age_group: AgeGroup::Age25To34,
            profession: Profession::Student,
            sales_channel: CategoryPath::root("Online")
                .child("Brand Websites")
                .unwrap(),
            distribution_channel: DistributionChannel::Online,
            price: 12.5,
            volume_units: 40,
            revenue: 500.0,
            market_value_usd: 520.0,
            market_share_pct: 3.2,
            cagr: 5.1,
            yoy_growth: 4.9,
            qty: 38,
        }
    }

    #[test]
    fn valid_record_passes() {
        validate_record(&record()).unwrap();
    }

    #[test]
    fn revenue_must_match_price_times_volume() {
        let mut r = record();
        r.revenue = 510.0;
        r.market_value_usd = 510.0;
        assert!(matches!(
            validate_record(&r),
            Err(ValidationError::RevenueMismatch { .. })
        ));
    }

    #[test]
    fn market_value_band_is_enforced() {
        let mut r = record();
        r.market_value_usd = 560.0;
        assert!(matches!(
            validate_record(&r),
            Err(ValidationError::MarketValueOutOfBand { .. })
        ));
    }

    #[test]
    fn non_finite_and_negative_values_are_rejected() {
        let mut r = record();
        r.cagr = f64::NAN;
        assert_eq!(
            validate_record(&r),
            Err(ValidationError::NonFinite {
                record_id: FIRST_RECORD_ID,
                field: "cagr"
            })
        );
        let mut r = record();
        r.price = -1.0;
        assert!(matches!(
            validate_record(&r),
            Err(ValidationError::NegativeMoney { field: "price", .. })
        ));
    }

    #[test]
    fn serde_record_uses_contract_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["recordId"], 100_000);
        assert_eq!(json["productType"], "Skin Care - Serums");
        assert_eq!(json["salesChannel"], "Online - Brand Websites");
        assert_eq!(json["priceRange"], "Premium");
        assert_eq!(json["ageGroup"], "25-34");
        assert_eq!(json["marketValueUsd"], 520.0);
        assert_eq!(json["volumeUnits"], 40);
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(2.125), 2.13);
        assert_eq!(round2(-2.125), -2.13);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(10.0), 10.0);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn regenerated_dataset_is_byte_identical() {
        let mut store = RecordStore::with_generator(Generator::default().years(2031..=2032));
        let first = serde_json::to_string(store.get()).unwrap();
        store.invalidate();
        assert_eq!(first, serde_json::to_string(store.get()).unwrap());
    }

    #[test]
    fn full_dataset_is_referentially_complete() {
        let store = RecordStore::new();
        let records = store.get();
        assert_eq!(records.len(), store.generator().expected_len());
        for r in records {
            assert!((r.revenue - r.price * r.volume_units as f64).abs() <= 0.005 + 1e-6);
            assert!((r.market_value_usd - r.revenue).abs() <= r.revenue * 0.1 + 0.005 + 1e-6);
            assert!((FIRST_YEAR..=LAST_YEAR).contains(&r.year));
        }
    }

    proptest! {
        #[test]
        fn round2_stays_within_half_a_cent(v in -1.0e9f64..1.0e9) {
            let r = round2(v);
            prop_assert!((r - v).abs() <= 0.005 + 1e-6);
        }
    }
}
