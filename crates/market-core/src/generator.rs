//! Deterministic synthetic record generation.
//!
//! Records enumerate the full cross-product of year, region, country,
//! product type, product form, price range and age group. Profession and
//! sales channel are drawn once per combination so the dataset stays bounded.

use crate::catalog::{leaf_paths, product_hierarchy, sales_channel_hierarchy, CategoryPath};
use crate::lcg::Lcg;
use crate::record::{
    AgeGroup, DistributionChannel, MarketRecord, PriceRange, ProductForm, Profession, Region,
};
use crate::{round2, validate_record, ValidationError};
use std::ops::RangeInclusive;
use tracing::{debug, info};

/// Seed the dataset is generated from unless a host overrides it.
pub const DEFAULT_SEED: u32 = 42;
/// First generated year.
pub const FIRST_YEAR: u16 = 2020;
/// Last generated year.
pub const LAST_YEAR: u16 = 2032;
/// Year the growth multiplier is anchored at.
pub const GROWTH_BASE_YEAR: u16 = FIRST_YEAR;
/// Linear yearly growth applied to volumes.
pub const DEFAULT_GROWTH_RATE: f64 = 0.045;
/// Id of the first generated record.
pub const FIRST_RECORD_ID: u64 = 100_000;

const BASE_PRICE_USD: f64 = 14.0;
const BASE_VOLUME_UNITS: f64 = 1_500.0;

/// Price and volume multipliers contributed by one categorical dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Factor {
    pub price: f64,
    pub volume: f64,
}

impl Factor {
    pub const NEUTRAL: Factor = Factor {
        price: 1.0,
        volume: 1.0,
    };

    const fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }

    fn combine(self, other: Factor) -> Factor {
        Factor {
            price: self.price * other.price,
            volume: self.volume * other.volume,
        }
    }
}

const PRICE_TIER_FACTORS: &[(&str, Factor)] = &[
    ("Mass", Factor::new(1.0, 1.8)),
    ("Premium", Factor::new(2.6, 1.0)),
    ("Luxury", Factor::new(6.5, 0.35)),
];

const REGION_FACTORS: &[(&str, Factor)] = &[
    ("North America", Factor::new(1.15, 1.0)),
    ("Europe", Factor::new(1.1, 0.9)),
    ("Asia Pacific", Factor::new(0.9, 1.55)),
    ("Rest of World", Factor::new(0.8, 0.6)),
];

const PRODUCT_FAMILY_FACTORS: &[(&str, Factor)] = &[
    ("Skin Care", Factor::new(1.2, 1.3)),
    ("Hair Care", Factor::new(0.85, 1.15)),
    ("Makeup", Factor::new(1.05, 1.0)),
    ("Fragrance", Factor::new(1.9, 0.55)),
    ("Bath & Body", Factor::new(0.7, 1.2)),
];

const CHANNEL_FACTORS: &[(&str, Factor)] = &[
    ("Offline", Factor::new(1.0, 1.1)),
    ("Online", Factor::new(0.93, 0.95)),
];

const AGE_GROUP_FACTORS: &[(&str, Factor)] = &[
    ("18-24", Factor::new(0.9, 0.85)),
    ("25-34", Factor::new(1.0, 1.25)),
    ("35-49", Factor::new(1.08, 1.1)),
    ("50+", Factor::new(1.12, 0.7)),
];

/// Factor for `key`, or [`Factor::NEUTRAL`] when the table has no entry.
pub fn lookup_factor(table: &[(&str, Factor)], key: &str) -> Factor {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, f)| *f)
        .unwrap_or(Factor::NEUTRAL)
}

/// Combined factor for one cross-product cell.
pub fn combined_factor(
    price_range: PriceRange,
    region: Region,
    product_type: &CategoryPath,
    sales_channel: &CategoryPath,
    age_group: AgeGroup,
) -> Factor {
    lookup_factor(PRICE_TIER_FACTORS, price_range.as_str())
        .combine(lookup_factor(REGION_FACTORS, region.as_str()))
        .combine(lookup_factor(PRODUCT_FAMILY_FACTORS, product_type.root_name()))
        .combine(lookup_factor(CHANNEL_FACTORS, sales_channel.root_name()))
        .combine(lookup_factor(AGE_GROUP_FACTORS, age_group.as_str()))
}

/// Synthetic dataset generator. The draw sequence is reseeded on every call
/// to [`Generator::generate`], so equal generators produce equal datasets.
#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    seed: u32,
    years: RangeInclusive<u16>,
    growth_rate: f64,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            years: FIRST_YEAR..=LAST_YEAR,
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }
}

impl Generator {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn years(mut self, years: RangeInclusive<u16>) -> Self {
        self.years = years;
        self
    }

    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = rate;
        self
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of records [`Generator::generate`] yields.
    pub fn expected_len(&self) -> usize {
        let countries: usize = Region::ALL
            .iter()
            .map(|r| r.reporting_countries().len())
            .sum();
        self.years.clone().count()
            * countries
            * leaf_paths(product_hierarchy()).len()
            * ProductForm::ALL.len()
            * PriceRange::ALL.len()
            * AgeGroup::ALL.len()
    }

    /// Build the full dataset. Every record is validated before it is
    /// returned.
    pub fn generate(&self) -> Result<Vec<MarketRecord>, ValidationError> {
        if !self.growth_rate.is_finite() {
            return Err(ValidationError::InvalidGrowthRate(self.growth_rate));
        }

        let product_types = leaf_paths(product_hierarchy());
        let sales_channels = leaf_paths(sales_channel_hierarchy());
        let mut lcg = Lcg::new(self.seed);
        let mut records = Vec::with_capacity(self.expected_len());
        let mut next_id = FIRST_RECORD_ID;

        debug!(
            seed = self.seed,
            product_types = product_types.len(),
            sales_channels = sales_channels.len(),
            "generating market records"
        );

        for year in self.years.clone() {
            let growth = 1.0 + f64::from(year.saturating_sub(GROWTH_BASE_YEAR)) * self.growth_rate;
            for &region in Region::ALL {
                for country in region.reporting_countries() {
                    for product_type in &product_types {
                        for &product_form in ProductForm::ALL {
                            for &price_range in PriceRange::ALL {
                                for &age_group in AgeGroup::ALL {
                                    let cell = Cell {
                                        record_id: next_id,
                                        year,
                                        growth,
                                        region,
                                        country,
                                        product_type: *product_type,
                                        product_form,
                                        price_range,
                                        age_group,
                                    };
                                    let record = cell.draw(&mut lcg, &sales_channels);
                                    validate_record(&record)?;
                                    records.push(record);
                                    next_id += 1;
                                }
                            }
                        }
                    }
                }
            }
        }

        info!(
            seed = self.seed,
            records = records.len(),
            "generated market records"
        );
        Ok(records)
    }
}

/// Fixed dimensions of one cross-product cell.
struct Cell {
    record_id: u64,
    year: u16,
    growth: f64,
    region: Region,
    country: &'static str,
    product_type: CategoryPath,
    product_form: ProductForm,
    price_range: PriceRange,
    age_group: AgeGroup,
}

impl Cell {
    /// Draw order is fixed: profession, channel, then the numeric noise terms.
    fn draw(&self, lcg: &mut Lcg, sales_channels: &[CategoryPath]) -> MarketRecord {
        let profession = lcg
            .pick(Profession::ALL)
            .copied()
            .unwrap_or(Profession::WorkingProfessional);
        let sales_channel = lcg
            .pick(sales_channels)
            .copied()
            .unwrap_or_else(|| CategoryPath::root(DistributionChannel::Online.as_str()));
        let distribution_channel = DistributionChannel::for_sales_channel(&sales_channel);

        let factor = combined_factor(
            self.price_range,
            self.region,
            &self.product_type,
            &sales_channel,
            self.age_group,
        );

        let price = round2(BASE_PRICE_USD * factor.price * lcg.between(0.85, 1.15));
        let volume = BASE_VOLUME_UNITS * factor.volume * self.growth * lcg.between(0.7, 1.3);
        let volume_units = volume.max(0.0).trunc() as u64;
        let revenue = round2(price * volume_units as f64);
        let market_value_usd = round2(revenue * lcg.between(0.9, 1.1));
        let market_share_pct = round2(lcg.between(0.5, 12.5));
        let cagr = round2(lcg.between(2.5, 10.0));
        let yoy_growth = round2(cagr * lcg.between(0.7, 1.3));
        let qty = (volume_units as f64 * lcg.between(0.9, 1.0)).trunc() as u64;

        MarketRecord {
            record_id: self.record_id,
            year: self.year,
            region: self.region,
            country: self.country,
            product_type: self.product_type,
            product_form: self.product_form,
            price_range: self.price_range,
            age_group: self.age_group,
            profession,
            sales_channel,
            distribution_channel,
            price,
            volume_units,
            revenue,
            market_value_usd,
            market_share_pct,
            cagr,
            yoy_growth,
            qty,
        }
    }
}
