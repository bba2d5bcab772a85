//! Chart-ready output shape plus the record dimensions and measures it is
//! keyed by.

use crate::AnalyticsError;
use market_core::{
    product_hierarchy, sales_channel_hierarchy, AgeGroup, CategoryNode, CategoryPath,
    DistributionChannel, MarketRecord, PriceRange, ProductForm, Profession, Region,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Record dimension a chart can be segmented or grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentField {
    Year,
    Region,
    Country,
    ProductType,
    ProductForm,
    PriceRange,
    AgeGroup,
    Profession,
    SalesChannel,
    DistributionChannel,
}

impl SegmentField {
    pub const ALL: &'static [SegmentField] = &[
        SegmentField::Year,
        SegmentField::Region,
        SegmentField::Country,
        SegmentField::ProductType,
        SegmentField::ProductForm,
        SegmentField::PriceRange,
        SegmentField::AgeGroup,
        SegmentField::Profession,
        SegmentField::SalesChannel,
        SegmentField::DistributionChannel,
    ];

    /// Record field name as serialized.
    pub const fn as_str(self) -> &'static str {
        match self {
            SegmentField::Year => "year",
            SegmentField::Region => "region",
            SegmentField::Country => "country",
            SegmentField::ProductType => "productType",
            SegmentField::ProductForm => "productForm",
            SegmentField::PriceRange => "priceRange",
            SegmentField::AgeGroup => "ageGroup",
            SegmentField::Profession => "profession",
            SegmentField::SalesChannel => "salesChannel",
            SegmentField::DistributionChannel => "distributionChannel",
        }
    }

    /// Display key of this dimension for `record`.
    pub fn key_of(self, record: &MarketRecord) -> String {
        match self {
            SegmentField::Year => record.year.to_string(),
            SegmentField::Region => record.region.as_str().to_string(),
            SegmentField::Country => record.country.to_string(),
            SegmentField::ProductType => record.product_type.to_string(),
            SegmentField::ProductForm => record.product_form.as_str().to_string(),
            SegmentField::PriceRange => record.price_range.as_str().to_string(),
            SegmentField::AgeGroup => record.age_group.as_str().to_string(),
            SegmentField::Profession => record.profession.as_str().to_string(),
            SegmentField::SalesChannel => record.sales_channel.to_string(),
            SegmentField::DistributionChannel => record.distribution_channel.as_str().to_string(),
        }
    }

    /// Category path for the hierarchical dimensions.
    pub fn path_of(self, record: &MarketRecord) -> Option<CategoryPath> {
        match self {
            SegmentField::ProductType => Some(record.product_type),
            SegmentField::SalesChannel => Some(record.sales_channel),
            _ => None,
        }
    }

    /// Taxonomy behind a hierarchical dimension.
    pub fn hierarchy(self) -> Option<&'static [CategoryNode]> {
        match self {
            SegmentField::ProductType => Some(product_hierarchy()),
            SegmentField::SalesChannel => Some(sales_channel_hierarchy()),
            _ => None,
        }
    }

    /// Parse a category label for a hierarchical dimension.
    pub fn parse_path(self, label: &str) -> Result<CategoryPath, AnalyticsError> {
        self.hierarchy()
            .and_then(|nodes| CategoryPath::parse(label, nodes))
            .ok_or_else(|| AnalyticsError::UnknownLabel {
                field: self.as_str(),
                value: label.to_string(),
            })
    }

    /// Canonical key for a user-supplied label: enum labels take their
    /// declared spelling, hierarchical labels must exist in the taxonomy.
    pub fn canonical_key(self, label: &str) -> Result<String, AnalyticsError> {
        let key = match self {
            SegmentField::Year => label
                .trim()
                .parse::<u16>()
                .map_err(|_| AnalyticsError::UnknownLabel {
                    field: self.as_str(),
                    value: label.to_string(),
                })?
                .to_string(),
            SegmentField::Region => label.parse::<Region>()?.as_str().to_string(),
            SegmentField::Country => label.trim().to_string(),
            SegmentField::ProductForm => label.parse::<ProductForm>()?.as_str().to_string(),
            SegmentField::PriceRange => label.parse::<PriceRange>()?.as_str().to_string(),
            SegmentField::AgeGroup => label.parse::<AgeGroup>()?.as_str().to_string(),
            SegmentField::Profession => label.parse::<Profession>()?.as_str().to_string(),
            SegmentField::DistributionChannel => {
                label.parse::<DistributionChannel>()?.as_str().to_string()
            }
            SegmentField::ProductType | SegmentField::SalesChannel => {
                self.parse_path(label)?.to_string()
            }
        };
        Ok(key)
    }
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase with separators removed, so `product-type`, `product_type`
/// and `productType` compare equal.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for SegmentField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        SegmentField::ALL
            .iter()
            .copied()
            .find(|f| normalize(f.as_str()) == wanted)
            .ok_or_else(|| AnalyticsError::UnknownSegmentField(s.to_string()))
    }
}

/// Summed measure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    #[default]
    MarketValue,
    Revenue,
    Volume,
    Qty,
}

impl Metric {
    pub fn value_of(self, record: &MarketRecord) -> f64 {
        match self {
            Metric::MarketValue => record.market_value_usd,
            Metric::Revenue => record.revenue,
            Metric::Volume => record.volume_units as f64,
            Metric::Qty => record.qty as f64,
        }
    }
}

impl FromStr for Metric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "value" | "marketvalue" | "marketvalueusd" => Ok(Metric::MarketValue),
            "revenue" => Ok(Metric::Revenue),
            "volume" | "volumeunits" => Ok(Metric::Volume),
            "qty" | "quantity" => Ok(Metric::Qty),
            _ => Err(AnalyticsError::UnknownMetric(s.to_string())),
        }
    }
}

/// One year of a chart: segment key to value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRow {
    pub year: u16,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Per-year rows plus the ordered segment axis. Every row carries every
/// segment key.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub rows: Vec<ChartRow>,
    pub segments: Vec<String>,
    pub is_stacked: bool,
}

impl ChartDataset {
    pub fn value(&self, year: u16, segment: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.year == year)
            .and_then(|row| row.values.get(segment))
            .copied()
    }

    pub fn years(&self) -> Vec<u16> {
        self.rows.iter().map(|row| row.year).collect()
    }
}

/// Sort and dedup segment keys: numerically when every key is a number,
/// lexicographically otherwise.
pub fn sort_segments(keys: &mut Vec<String>) {
    let as_number = |k: &String| k.trim().parse::<f64>().ok();
    if keys.iter().all(|k| as_number(k).is_some()) {
        keys.sort_by(|a, b| {
            as_number(a)
                .partial_cmp(&as_number(b))
                .unwrap_or(Ordering::Equal)
        });
    } else {
        keys.sort();
    }
    keys.dedup();
}
