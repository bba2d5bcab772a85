#![deny(warnings)]

//! Chart projections over market records.
//!
//! This crate turns a flat, optionally filtered record set into the
//! declarative datasets a dashboard renders:
//! - Grouped and stacked per-year segment charts, including the
//!   parent/children switch for hierarchical dimensions
//! - Country shares within each region
//! - The incremental-opportunity waterfall
//! - Attractiveness bubbles (laid out by [`bubble_layout`]) and growth series
//!
//! Every function is pure. Empty input is valid and yields empty or zeroed
//! output; ratios never produce NaN or infinities.

pub mod aggregate;
pub mod attractiveness;
pub mod breakdown;
pub mod dataset;
mod entities;
pub mod filter;
pub mod growth;
pub mod metrics;
pub mod waterfall;

pub use aggregate::{
    aggregate_by_year_and_segment, aggregate_grouped, aggregate_stacked_active, AggregateOptions,
};
pub use attractiveness::compute_attractiveness;
pub use breakdown::{region_country_breakdown, EvaluationMode, RegionBreakdown};
pub use dataset::{ChartDataset, ChartRow, Metric, SegmentField};
pub use filter::{filter_records, FilterCriteria};
pub use growth::{compute_yoy_and_cagr, GrowthPoint, GrowthSeries};
pub use metrics::{compute_cagr, compute_yoy, label_opportunity};
pub use waterfall::{compute_waterfall, StepKind, Waterfall, WaterfallConfig, WaterfallStep};

use market_core::ParseError;
use thiserror::Error;

/// Errors interpreting caller-supplied names and labels.
#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    #[error("unknown segment field: {0:?}")]
    UnknownSegmentField(String),
    #[error("unknown metric: {0:?}")]
    UnknownMetric(String),
    #[error("unknown evaluation mode: {0:?}")]
    UnknownMode(String),
    /// Label not present in the dimension's taxonomy or value set.
    #[error("unknown {field} label: {value:?}")]
    UnknownLabel { field: &'static str, value: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
