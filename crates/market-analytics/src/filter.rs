//! Record filtering.

use market_core::{
    AgeGroup, CategoryPath, DistributionChannel, MarketRecord, PriceRange, ProductForm,
    Profession, Region,
};
use serde::Serialize;
use tracing::debug;

/// One membership list per record dimension. An empty list admits every
/// record; non-empty lists are AND-combined.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub years: Vec<u16>,
    pub regions: Vec<Region>,
    /// Matched ASCII case-insensitively.
    pub countries: Vec<String>,
    /// A record matches when its product type lies within any entry.
    pub product_types: Vec<CategoryPath>,
    pub product_forms: Vec<ProductForm>,
    pub price_ranges: Vec<PriceRange>,
    pub age_groups: Vec<AgeGroup>,
    pub professions: Vec<Profession>,
    /// A record matches when its sales channel lies within any entry.
    pub sales_channels: Vec<CategoryPath>,
    pub distribution_channels: Vec<DistributionChannel>,
}

fn admits<T: PartialEq>(wanted: &[T], value: &T) -> bool {
    wanted.is_empty() || wanted.contains(value)
}

fn admits_path(wanted: &[CategoryPath], path: &CategoryPath) -> bool {
    wanted.is_empty() || wanted.iter().any(|ancestor| path.is_within(ancestor))
}

impl FilterCriteria {
    /// True when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self == &FilterCriteria::default()
    }

    pub fn matches(&self, record: &MarketRecord) -> bool {
        admits(&self.years, &record.year)
            && admits(&self.regions, &record.region)
            && (self.countries.is_empty()
                || self
                    .countries
                    .iter()
                    .any(|c| c.trim().eq_ignore_ascii_case(record.country)))
            && admits_path(&self.product_types, &record.product_type)
            && admits(&self.product_forms, &record.product_form)
            && admits(&self.price_ranges, &record.price_range)
            && admits(&self.age_groups, &record.age_group)
            && admits(&self.professions, &record.profession)
            && admits_path(&self.sales_channels, &record.sales_channel)
            && admits(&self.distribution_channels, &record.distribution_channel)
    }
}

/// Records admitted by `criteria`, in input order.
pub fn filter_records(records: &[MarketRecord], criteria: &FilterCriteria) -> Vec<MarketRecord> {
    if criteria.is_empty() {
        return records.to_vec();
    }
    let kept: Vec<MarketRecord> = records
        .iter()
        .filter(|r| criteria.matches(r))
        .copied()
        .collect();
    debug!(total = records.len(), kept = kept.len(), "records filtered");
    kept
}
