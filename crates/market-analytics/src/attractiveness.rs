//! Market attractiveness bubbles: growth index against share index, sized
//! by incremental opportunity.

use crate::dataset::{Metric, SegmentField};
use crate::entities::resolve_entities;
use crate::metrics::{compute_cagr, label_opportunity};
use crate::AnalyticsError;
use bubble_layout::{resolve, BubbleEntity, LayoutConfig};
use market_core::{MarketRecord, Region};
use tracing::debug;

pub const WINDOW_START: u16 = 2025;
pub const WINDOW_END: u16 = 2032;
/// Index used for entities without a regional default.
pub const NEUTRAL_INDEX: f64 = 5.0;
pub const MAX_INDEX: f64 = 10.0;
/// Opportunity unit (USD millions).
const OPPORTUNITY_UNIT: f64 = 1.0e6;

/// Default `(cagr_index, market_share_index)` for a region label.
pub fn region_default_indexes(label: &str) -> Option<(f64, f64)> {
    let region = label.parse::<Region>().ok()?;
    Some(match region {
        Region::NorthAmerica => (6.5, 8.2),
        Region::Europe => (4.8, 7.1),
        Region::AsiaPacific => (8.7, 6.4),
        Region::RestOfWorld => (7.2, 3.1),
    })
}

fn to_index(percent: f64) -> f64 {
    (percent / 10.0).clamp(0.0, MAX_INDEX)
}

/// Bubble per entity of `group_by` over the 2025..=2032 window, laid out by
/// the bubble resolver. Substituted indexes and opportunities are flagged on
/// the entity.
pub fn compute_attractiveness(
    records: &[MarketRecord],
    group_by: SegmentField,
    selection: &[String],
    layout: &LayoutConfig,
) -> Result<Vec<BubbleEntity>, AnalyticsError> {
    let window: Vec<MarketRecord> = records
        .iter()
        .filter(|r| (WINDOW_START..=WINDOW_END).contains(&r.year))
        .copied()
        .collect();
    let entities = resolve_entities(&window, group_by, selection)?;

    let per_entity: Vec<_> = entities
        .iter()
        .map(|e| e.year_totals(&window, Metric::MarketValue))
        .collect();
    let entity_totals: Vec<f64> = per_entity.iter().map(|t| t.values().sum()).collect();
    // Share is taken against the whole window, independent of the selection.
    let grand_total: f64 = window.iter().map(|r| Metric::MarketValue.value_of(r)).sum();

    let mut bubbles = Vec::with_capacity(entities.len());
    for ((entity, totals), total) in entities.iter().zip(&per_entity).zip(&entity_totals) {
        let start = totals.get(&WINDOW_START).copied().unwrap_or(0.0);
        let end = totals.get(&WINDOW_END).copied().unwrap_or(0.0);
        let share_pct = if grand_total > 0.0 {
            total / grand_total * 100.0
        } else {
            0.0
        };
        let cagr_pct = compute_cagr(start, end, f64::from(WINDOW_END - WINDOW_START)) * 100.0;

        let (default_cagr, default_share) =
            region_default_indexes(&entity.label).unwrap_or((NEUTRAL_INDEX, NEUTRAL_INDEX));
        let mut bubble = BubbleEntity::new(
            entity.label.clone(),
            to_index(cagr_pct),
            to_index(share_pct),
            (end - start) / OPPORTUNITY_UNIT,
        );
        if cagr_pct <= 0.0 {
            bubble.cagr_index = default_cagr;
            bubble.index_defaulted = true;
        }
        if share_pct <= 0.0 {
            bubble.market_share_index = default_share;
            bubble.index_defaulted = true;
        }
        if !(bubble.incremental_opportunity > 0.0) {
            bubble.incremental_opportunity = label_opportunity(&entity.label);
            bubble.opportunity_estimated = true;
        }
        bubbles.push(bubble);
    }

    let defaulted = bubbles.iter().filter(|b| b.index_defaulted).count();
    let estimated = bubbles.iter().filter(|b| b.opportunity_estimated).count();
    debug!(
        %group_by,
        entities = bubbles.len(),
        defaulted,
        estimated,
        "attractiveness computed"
    );
    Ok(resolve(bubbles, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ESTIMATED_OPPORTUNITY_MAX, ESTIMATED_OPPORTUNITY_MIN};
    use crate::test_support::{in_region, record};
    use bubble_layout::{overlapping_pairs, resolve_with_report};

    fn window_records() -> Vec<MarketRecord> {
        market_core::Generator::default()
            .years(2025..=2025)
            .generate()
            .unwrap()
            .into_iter()
            .chain(
                market_core::Generator::default()
                    .years(2032..=2032)
                    .generate()
                    .unwrap(),
            )
            .collect()
    }

    #[test]
    fn regions_get_real_indexes_and_opportunity() {
        let records = window_records();
        let config = LayoutConfig::default();
        let bubbles = compute_attractiveness(&records, SegmentField::Region, &[], &config).unwrap();
        assert_eq!(bubbles.len(), 4);
        for b in &bubbles {
            assert!(!b.index_defaulted, "{}", b.label);
            assert!(!b.opportunity_estimated, "{}", b.label);
            assert!(b.incremental_opportunity > 0.0);
            assert!((0.0..=MAX_INDEX).contains(&b.cagr_index));
            assert!((0.0..=MAX_INDEX).contains(&b.market_share_index));
        }
    }

    #[test]
    fn share_index_does_not_depend_on_the_selection() {
        let records = window_records();
        let config = LayoutConfig::default();
        let share_of = |field: SegmentField, selection: &[String], label: &str| {
            compute_attractiveness(&records, field, selection, &config)
                .unwrap()
                .into_iter()
                .find(|b| b.label == label)
                .unwrap()
                .market_share_index
        };

        let alone = share_of(SegmentField::Region, &["Europe".to_string()], "Europe");
        let among_all = share_of(SegmentField::Region, &[], "Europe");
        assert!((alone - among_all).abs() < 1e-12);
        assert!(alone < MAX_INDEX);

        let product = SegmentField::ProductType;
        let nested = ["Skin Care".to_string(), "Skin Care - Serums".to_string()];
        let parent = share_of(product, &nested, "Skin Care");
        let child = share_of(product, &nested, "Skin Care - Serums");
        let parent_alone = share_of(product, &nested[..1], "Skin Care");
        let child_alone = share_of(product, &nested[1..], "Skin Care - Serums");
        assert!((parent - parent_alone).abs() < 1e-12);
        assert!((child - child_alone).abs() < 1e-12);
        assert!(child < parent);
    }

    #[test]
    fn missing_data_falls_back_to_flagged_defaults() {
        let records = vec![in_region(
            record(2025, "Makeup", &["Lipstick"], 10.0),
            Region::Europe,
            "France",
        )];
        let selection = vec!["Europe".to_string(), "Asia Pacific".to_string()];
        let config = LayoutConfig::default();
        let field = SegmentField::Region;
        let raw = compute_attractiveness(&records, field, &selection, &config).unwrap();
        let apac = raw.iter().find(|b| b.label == "Asia Pacific").unwrap();
        assert!(apac.index_defaulted);
        assert!(apac.opportunity_estimated);
        let estimated = ESTIMATED_OPPORTUNITY_MIN..=ESTIMATED_OPPORTUNITY_MAX;
        assert!(estimated.contains(&apac.incremental_opportunity));
        assert_eq!(
            apac.incremental_opportunity,
            label_opportunity("Asia Pacific")
        );

        let europe = raw.iter().find(|b| b.label == "Europe").unwrap();
        assert!(europe.index_defaulted);
        assert!(europe.opportunity_estimated);
    }

    #[test]
    fn non_region_entities_use_the_neutral_default() {
        let bubbles = compute_attractiveness(
            &[],
            SegmentField::PriceRange,
            &["Luxury".to_string()],
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].cagr_index, NEUTRAL_INDEX);
        assert_eq!(bubbles[0].market_share_index, NEUTRAL_INDEX);
        assert!(bubbles[0].index_defaulted);
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let records = vec![record(2024, "Fragrance", &[], 1.0e9)];
        let bubbles = compute_attractiveness(
            &records,
            SegmentField::ProductType,
            &["Fragrance".to_string()],
            &LayoutConfig::default(),
        )
        .unwrap();
        assert!(bubbles[0].opportunity_estimated);
        assert!(bubbles[0].index_defaulted);
    }

    #[test]
    fn product_bubbles_are_laid_out_without_overlap() {
        let records = window_records();
        let selection: Vec<String> = [
            "Skin Care",
            "Hair Care",
            "Makeup",
            "Fragrance",
            "Bath & Body",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let config = LayoutConfig::default();
        let field = SegmentField::ProductType;
        let bubbles = compute_attractiveness(&records, field, &selection, &config).unwrap();
        assert_eq!(bubbles.len(), 5);
        let (relaid, report) = resolve_with_report(bubbles, &config);
        assert!(report.converged);
        assert!(overlapping_pairs(&relaid, &report, &config).is_empty());
    }

    #[test]
    fn unknown_selection_is_an_error() {
        let err = compute_attractiveness(
            &[],
            SegmentField::ProductType,
            &["Skin Care - Lasers".to_string()],
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownLabel { .. }));
    }

    #[test]
    fn region_defaults_cover_every_region() {
        for region in Region::ALL {
            assert!(region_default_indexes(region.as_str()).is_some());
        }
        assert_eq!(region_default_indexes("Skin Care"), None);
    }
}
