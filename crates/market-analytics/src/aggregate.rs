//! Year x segment aggregation into chart datasets.

use crate::dataset::{sort_segments, ChartDataset, ChartRow, Metric, SegmentField};
use market_core::{
    children_of, expand_selection, find_node, CategoryNode, CategoryPath, MarketRecord,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// How [`aggregate_by_year_and_segment`] builds its dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOptions {
    pub metric: Metric,
    /// Explicit segment axis for flat fields. Empty means every observed key.
    pub segments: Vec<String>,
    /// Drop all-zero segments and flag the dataset as stacked.
    pub stacked: bool,
    /// Selected categories for hierarchical fields.
    pub selection: Vec<CategoryPath>,
}

/// Sum `value_of` per (year, segment). Every year in `records` gets a row.
/// Records whose `segment_of` is `None` or empty add no value. With
/// `explicit_segments`, the axis is that list (sorted) and records outside it
/// add no value; otherwise it is every observed segment. Missing pairs are 0.
pub fn aggregate_grouped<S, V>(
    records: &[MarketRecord],
    segment_of: S,
    value_of: V,
    explicit_segments: Option<&[String]>,
) -> ChartDataset
where
    S: Fn(&MarketRecord) -> Option<String>,
    V: Fn(&MarketRecord) -> f64,
{
    let allowed: Option<BTreeSet<&str>> =
        explicit_segments.map(|list| list.iter().map(String::as_str).collect());
    let mut sums: BTreeMap<u16, HashMap<String, f64>> = BTreeMap::new();
    let mut observed: BTreeSet<String> = BTreeSet::new();

    for record in records {
        // Every input year gets a row, even if none of its segments are kept.
        let by_segment = sums.entry(record.year).or_default();
        let Some(segment) = segment_of(record).filter(|s| !s.is_empty()) else {
            continue;
        };
        if allowed
            .as_ref()
            .is_some_and(|a| !a.contains(segment.as_str()))
        {
            continue;
        }
        *by_segment.entry(segment.clone()).or_insert(0.0) += value_of(record);
        observed.insert(segment);
    }

    let mut segments: Vec<String> = match explicit_segments {
        Some(list) => list.to_vec(),
        None => observed.into_iter().collect(),
    };
    sort_segments(&mut segments);

    let rows = sums
        .into_iter()
        .map(|(year, by_segment)| ChartRow {
            year,
            values: segments
                .iter()
                .map(|s| (s.clone(), by_segment.get(s).copied().unwrap_or(0.0)))
                .collect(),
        })
        .collect();

    ChartDataset {
        rows,
        segments,
        is_stacked: false,
    }
}

/// [`aggregate_grouped`] flagged as stacked, without segments that are 0
/// in every year.
pub fn aggregate_stacked_active<S, V>(
    records: &[MarketRecord],
    segment_of: S,
    value_of: V,
    explicit_segments: Option<&[String]>,
) -> ChartDataset
where
    S: Fn(&MarketRecord) -> Option<String>,
    V: Fn(&MarketRecord) -> f64,
{
    let mut dataset = aggregate_grouped(records, segment_of, value_of, explicit_segments);
    let inactive: Vec<String> = dataset
        .segments
        .iter()
        .filter(|s| {
            dataset
                .rows
                .iter()
                .all(|row| row.values.get(s.as_str()).copied().unwrap_or(0.0) == 0.0)
        })
        .cloned()
        .collect();
    dataset.segments.retain(|s| !inactive.contains(s));
    for row in &mut dataset.rows {
        row.values.retain(|k, _| !inactive.contains(k));
    }
    dataset.is_stacked = true;
    dataset
}

fn aggregate_with<S>(
    records: &[MarketRecord],
    segment_of: S,
    metric: Metric,
    explicit_segments: Option<&[String]>,
    stacked: bool,
) -> ChartDataset
where
    S: Fn(&MarketRecord) -> Option<String>,
{
    let value_of = |r: &MarketRecord| metric.value_of(r);
    if stacked {
        aggregate_stacked_active(records, segment_of, value_of, explicit_segments)
    } else {
        aggregate_grouped(records, segment_of, value_of, explicit_segments)
    }
}

/// Chart dataset for `records` segmented by `field`.
///
/// Hierarchical fields follow the selection: exactly one top-level parent
/// with children gives a stacked chart of that parent's direct children;
/// any other non-empty selection gives a grouped chart over the expanded
/// leaves; no selection groups by observed values.
pub fn aggregate_by_year_and_segment(
    records: &[MarketRecord],
    field: SegmentField,
    options: &AggregateOptions,
) -> ChartDataset {
    let dataset = match field.hierarchy() {
        Some(nodes) => aggregate_hierarchical(records, field, nodes, options),
        None => {
            let explicit = (!options.segments.is_empty()).then_some(options.segments.as_slice());
            aggregate_with(
                records,
                |r| Some(field.key_of(r)),
                options.metric,
                explicit,
                options.stacked,
            )
        }
    };
    debug!(
        %field,
        records = records.len(),
        segments = dataset.segments.len(),
        stacked = dataset.is_stacked,
        "aggregated by year and segment"
    );
    dataset
}

/// The single selected top-level parent, if that parent has children.
fn single_parent(nodes: &[CategoryNode], selection: &[CategoryPath]) -> Option<CategoryPath> {
    match selection {
        [parent] if parent.depth() == 1 => find_node(nodes, parent)
            .filter(|node| !node.is_leaf())
            .map(|_| *parent),
        _ => None,
    }
}

fn aggregate_hierarchical(
    records: &[MarketRecord],
    field: SegmentField,
    nodes: &'static [CategoryNode],
    options: &AggregateOptions,
) -> ChartDataset {
    if let Some(parent) = single_parent(nodes, &options.selection) {
        let children: Vec<String> = children_of(nodes, &parent)
            .iter()
            .map(ToString::to_string)
            .collect();
        let child_depth = parent.depth() + 1;
        return aggregate_stacked_active(
            records,
            |r| {
                field
                    .path_of(r)
                    .filter(|p| p.is_within(&parent) && p.depth() >= child_depth)
                    .map(|p| p.truncated(child_depth).to_string())
            },
            |r| options.metric.value_of(r),
            Some(children.as_slice()),
        );
    }

    if options.selection.is_empty() {
        return aggregate_with(
            records,
            |r| field.path_of(r).map(|p| p.to_string()),
            options.metric,
            None,
            options.stacked,
        );
    }

    let leaves = expand_selection(nodes, &options.selection);
    let labels: Vec<String> = leaves.iter().map(ToString::to_string).collect();
    aggregate_with(
        records,
        |r| {
            field
                .path_of(r)
                .filter(|p| leaves.contains(p))
                .map(|p| p.to_string())
        },
        options.metric,
        Some(labels.as_slice()),
        options.stacked,
    )
}
