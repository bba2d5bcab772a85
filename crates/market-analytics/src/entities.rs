//! Entity resolution shared by the attractiveness and growth calculators.

use crate::dataset::{sort_segments, Metric, SegmentField};
use crate::metrics::year_totals;
use crate::AnalyticsError;
use market_core::{expand_selection, CategoryPath, MarketRecord};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug)]
enum Matcher {
    Key(String),
    Leaves(BTreeSet<CategoryPath>),
}

/// A labelled subset of records.
#[derive(Debug)]
pub(crate) struct Entity {
    pub label: String,
    field: SegmentField,
    matcher: Matcher,
}

impl Entity {
    pub fn matches(&self, record: &MarketRecord) -> bool {
        match &self.matcher {
            Matcher::Key(key) => self.field.key_of(record) == *key,
            Matcher::Leaves(leaves) => self
                .field
                .path_of(record)
                .is_some_and(|path| leaves.contains(&path)),
        }
    }

    /// Per-year totals of `metric` over this entity's records.
    pub fn year_totals(&self, records: &[MarketRecord], metric: Metric) -> BTreeMap<u16, f64> {
        year_totals(records, metric, |r| self.matches(r))
    }
}

/// Entities for `selection` under `field`. An empty selection yields every
/// key observed in `records`; a hierarchical label covers its expanded
/// leaves.
pub(crate) fn resolve_entities(
    records: &[MarketRecord],
    field: SegmentField,
    selection: &[String],
) -> Result<Vec<Entity>, AnalyticsError> {
    if selection.is_empty() {
        let mut keys: Vec<String> = records
            .iter()
            .map(|r| field.key_of(r))
            .filter(|k| !k.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        sort_segments(&mut keys);
        return Ok(keys
            .into_iter()
            .map(|key| Entity {
                label: key.clone(),
                field,
                matcher: Matcher::Key(key),
            })
            .collect());
    }

    let mut entities: Vec<Entity> = Vec::with_capacity(selection.len());
    for label in selection {
        let entity = match field.hierarchy() {
            Some(nodes) => {
                let path = field.parse_path(label)?;
                Entity {
                    label: path.to_string(),
                    field,
                    matcher: Matcher::Leaves(expand_selection(nodes, &[path])),
                }
            }
            None => {
                let key = field.canonical_key(label)?;
                Entity {
                    label: key.clone(),
                    field,
                    matcher: Matcher::Key(key),
                }
            }
        };
        if !entities.iter().any(|e| e.label == entity.label) {
            entities.push(entity);
        }
    }
    Ok(entities)
}
