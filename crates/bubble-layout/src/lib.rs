#![deny(warnings)]

//! Collision-avoiding placement for proportionally sized bubbles.
//!
//! Bubbles live on a bounded 2D index plane (CAGR index x market-share
//! index). Each bubble's rendered radius follows its incremental
//! opportunity. [`resolve`] relaxes the positions pair by pair until no two
//! rendered circles are closer than the configured separation, or the pass
//! ceiling is reached. There is no global objective: every correction is
//! local to one pair, and the result is deterministic for a given input
//! order and config.

mod config;

pub use config::{LayoutConfig, LayoutError};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

/// Centre distances below this many pixels are treated as coincident.
const COINCIDENT_PX: f64 = 1e-6;

/// One market entity plotted on the attractiveness chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleEntity {
    pub label: String,
    /// X position in `[0, 10]`.
    pub cagr_index: f64,
    /// Y position in `[0, 10]`.
    pub market_share_index: f64,
    /// Drives the rendered size; > 0.
    pub incremental_opportunity: f64,
    /// The opportunity is a stable per-label estimate, not computed data.
    #[serde(default)]
    pub opportunity_estimated: bool,
    /// At least one index is a default, not computed data.
    #[serde(default)]
    pub index_defaulted: bool,
}

impl BubbleEntity {
    pub fn new(
        label: impl Into<String>,
        cagr_index: f64,
        market_share_index: f64,
        incremental_opportunity: f64,
    ) -> Self {
        Self {
            label: label.into(),
            cagr_index,
            market_share_index,
            incremental_opportunity,
            opportunity_estimated: false,
            index_defaulted: false,
        }
    }
}

/// Data units covered by one pixel on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelScale {
    pub x_units_per_px: f64,
    pub y_units_per_px: f64,
}

impl PixelScale {
    /// Scale from the observed data range. A degenerate axis spans the full
    /// display domain instead.
    pub fn observe(entities: &[BubbleEntity], config: &LayoutConfig) -> Self {
        let x_span = axis_span(entities.iter().map(|e| e.cagr_index), config);
        let y_span = axis_span(entities.iter().map(|e| e.market_share_index), config);
        Self {
            x_units_per_px: x_span / config.plot_width_px,
            y_units_per_px: y_span / config.plot_height_px,
        }
    }

    fn to_px(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.x_units_per_px, dy / self.y_units_per_px)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn axis_span(values: impl Iterator<Item = f64>, config: &LayoutConfig) -> f64 {
    let (lo, hi) = min_max(values);
    let observed = hi - lo;
    if observed.is_finite() && observed >= config.min_axis_span {
        observed
    } else {
        config.domain_span()
    }
}

/// Outcome of a resolver run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutReport {
    /// Passes executed, including the final overlap-free check.
    pub iterations: u32,
    /// No pair overlaps at the end of the run, measured under [`Self::scale`].
    ///
    /// Resolved pairs may sit up to `overlap_tolerance_px` inside the required
    /// separation. Re-projecting the output through a scale observed from the
    /// adjusted positions can therefore show overlaps again; check with
    /// [`overlapping_pairs`] and this report.
    pub converged: bool,
    /// Rendered radius per entity, in input order.
    pub radii_px: Vec<f64>,
    /// Geometry the collision checks used, observed from the clamped input
    /// positions and fixed for the whole run.
    pub scale: PixelScale,
}

/// Rendered diameter per entity: linear in opportunity between the
/// configured bounds, or the default diameter when all opportunities match.
pub fn rendered_diameters(entities: &[BubbleEntity], config: &LayoutConfig) -> Vec<f64> {
    let (lo, hi) = min_max(
        entities
            .iter()
            .map(|e| e.incremental_opportunity)
            .filter(|v| v.is_finite()),
    );
    let range = hi - lo;
    entities
        .iter()
        .map(|e| {
            let t = (e.incremental_opportunity - lo) / range;
            if range.is_finite() && range > f64::EPSILON && t.is_finite() {
                config.min_diameter_px
                    + t.clamp(0.0, 1.0) * (config.max_diameter_px - config.min_diameter_px)
            } else {
                config.default_diameter_px
            }
        })
        .collect()
}

/// Index pairs whose rendered circles are closer than the separation rule
/// allows under `report`'s geometry.
pub fn overlapping_pairs(
    entities: &[BubbleEntity],
    report: &LayoutReport,
    config: &LayoutConfig,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let (dx, dy) = report.scale.to_px(
                entities[j].cagr_index - entities[i].cagr_index,
                entities[j].market_share_index - entities[i].market_share_index,
            );
            let required = (report.radii_px[i] + report.radii_px[j]) * config.min_separation;
            if dx.hypot(dy) < required - config.overlap_tolerance_px {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Resolve overlaps and return the adjusted entities.
pub fn resolve(entities: Vec<BubbleEntity>, config: &LayoutConfig) -> Vec<BubbleEntity> {
    resolve_with_report(entities, config).0
}

/// Resolve overlaps, also returning how the run went. Labels and
/// opportunities are never changed; only the two indexes move.
pub fn resolve_with_report(
    mut entities: Vec<BubbleEntity>,
    config: &LayoutConfig,
) -> (Vec<BubbleEntity>, LayoutReport) {
    for e in &mut entities {
        e.cagr_index = config.clamp_to_domain(e.cagr_index);
        e.market_share_index = config.clamp_to_domain(e.market_share_index);
    }

    let radii_px: Vec<f64> = rendered_diameters(&entities, config)
        .into_iter()
        .map(|d| d / 2.0)
        .collect();
    let scale = PixelScale::observe(&entities, config);
    let mut xs: Vec<f64> = entities.iter().map(|e| e.cagr_index).collect();
    let mut ys: Vec<f64> = entities.iter().map(|e| e.market_share_index).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.jitter_seed);

    let n = entities.len();
    let mut iterations = 0;
    let mut clean_pass = n < 2;
    while !clean_pass && iterations < config.max_iterations {
        iterations += 1;
        clean_pass = true;
        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = scale.to_px(xs[j] - xs[i], ys[j] - ys[i]);
                let distance = dx.hypot(dy);
                let required = (radii_px[i] + radii_px[j]) * config.min_separation;
                if distance >= required - config.overlap_tolerance_px {
                    continue;
                }
                clean_pass = false;

                let (ux, uy) = if distance < COINCIDENT_PX {
                    let angle = rng.gen_range(0.0..TAU);
                    (angle.cos(), angle.sin())
                } else {
                    (dx / distance, dy / distance)
                };
                let push = (required - distance) * config.damping;
                let radius_sum = radii_px[i] + radii_px[j];
                // The smaller bubble takes the larger share of the move.
                let share_i = if radius_sum > 0.0 {
                    radii_px[j] / radius_sum
                } else {
                    0.5
                };
                let share_j = 1.0 - share_i;

                xs[i] = config.clamp_to_domain(xs[i] - ux * push * share_i * scale.x_units_per_px);
                ys[i] = config.clamp_to_domain(ys[i] - uy * push * share_i * scale.y_units_per_px);
                xs[j] = config.clamp_to_domain(xs[j] + ux * push * share_j * scale.x_units_per_px);
                ys[j] = config.clamp_to_domain(ys[j] + uy * push * share_j * scale.y_units_per_px);
            }
        }
    }

    for (e, (x, y)) in entities.iter_mut().zip(xs.into_iter().zip(ys)) {
        e.cagr_index = x;
        e.market_share_index = y;
    }

    let mut report = LayoutReport {
        iterations,
        converged: false,
        radii_px,
        scale,
    };
    report.converged = clean_pass || overlapping_pairs(&entities, &report, config).is_empty();
    debug!(
        entities = n,
        iterations = report.iterations,
        converged = report.converged,
        "bubble layout resolved"
    );
    (entities, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::Rng;

    fn random_entities(rng: &mut ChaCha8Rng, n: usize) -> Vec<BubbleEntity> {
        (0..n)
            .map(|i| {
                BubbleEntity::new(
                    format!("E{i}"),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(0.0..10.0),
                    rng.gen_range(100.0..1_000.0),
                )
            })
            .collect()
    }

    #[test]
    fn coincident_bubbles_are_split_and_sized_by_opportunity() {
        let cfg = LayoutConfig::default();
        let input = vec![
            BubbleEntity::new("A", 5.0, 5.0, 250.0),
            BubbleEntity::new("B", 5.0, 5.0, 400.0),
            BubbleEntity::new("C", 5.0, 5.0, 650.0),
        ];
        let (out, report) = resolve_with_report(input, &cfg);

        assert!(report.radii_px[0] < report.radii_px[1]);
        assert!(report.radii_px[1] < report.radii_px[2]);
        for i in 0..out.len() {
            for j in (i + 1)..out.len() {
                assert!(
                    out[i].cagr_index != out[j].cagr_index
                        || out[i].market_share_index != out[j].market_share_index,
                    "{} and {} share a position",
                    out[i].label,
                    out[j].label
                );
            }
        }
        assert!(report.converged);
        assert!(overlapping_pairs(&out, &report, &cfg).is_empty());
    }

    #[test]
    fn labels_and_opportunities_are_preserved() {
        let cfg = LayoutConfig::default();
        let input = vec![
            BubbleEntity::new("North America", 4.0, 4.0, 300.0),
            BubbleEntity::new("Europe", 4.1, 4.1, 500.0),
        ];
        let out = resolve(input.clone(), &cfg);
        assert_eq!(out.len(), 2);
        for (before, after) in input.iter().zip(&out) {
            assert_eq!(before.label, after.label);
            assert_eq!(
                before.incremental_opportunity,
                after.incremental_opportunity
            );
        }
    }

    #[test]
    fn equal_opportunities_use_default_diameter() {
        let cfg = LayoutConfig::default();
        let input = vec![
            BubbleEntity::new("A", 1.0, 1.0, 300.0),
            BubbleEntity::new("B", 9.0, 9.0, 300.0),
        ];
        assert_eq!(rendered_diameters(&input, &cfg), vec![50.0, 50.0]);
    }

    #[test]
    fn diameters_interpolate_between_bounds() {
        let cfg = LayoutConfig::default();
        let input = vec![
            BubbleEntity::new("A", 1.0, 1.0, 100.0),
            BubbleEntity::new("B", 2.0, 2.0, 200.0),
            BubbleEntity::new("C", 3.0, 3.0, 300.0),
        ];
        assert_eq!(rendered_diameters(&input, &cfg), vec![20.0, 50.0, 80.0]);
    }

    #[test]
    fn separated_bubbles_do_not_move() {
        let cfg = LayoutConfig::default();
        let input = vec![
            BubbleEntity::new("A", 0.0, 0.0, 100.0),
            BubbleEntity::new("B", 10.0, 10.0, 900.0),
        ];
        let (out, report) = resolve_with_report(input.clone(), &cfg);
        assert_eq!(out, input);
        assert_eq!(report.iterations, 1);
        assert!(report.converged);
    }

    #[test]
    fn report_scale_is_observed_from_the_input() {
        let cfg = LayoutConfig::default();
        let input = vec![
            BubbleEntity::new("A", 4.0, 6.0, 200.0),
            BubbleEntity::new("B", 4.2, 6.1, 800.0),
            BubbleEntity::new("C", 7.0, 2.0, 500.0),
        ];
        let expected = PixelScale::observe(&input, &cfg);
        let (out, report) = resolve_with_report(input, &cfg);
        assert_eq!(report.scale, expected);
        assert!(report.converged);
        assert!(overlapping_pairs(&out, &report, &cfg).is_empty());
    }

    #[test]
    fn trivial_inputs() {
        let cfg = LayoutConfig::default();
        assert!(resolve(Vec::new(), &cfg).is_empty());
        let (one, report) =
            resolve_with_report(vec![BubbleEntity::new("solo", 12.0, -1.0, 1.0)], &cfg);
        assert_eq!((one[0].cagr_index, one[0].market_share_index), (10.0, 0.0));
        assert_eq!(report.iterations, 0);
        assert!(report.converged);
    }

    #[test]
    fn resolution_is_deterministic() {
        let cfg = LayoutConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let input = random_entities(&mut rng, 8);
        assert_eq!(resolve(input.clone(), &cfg), resolve(input, &cfg));
    }

    #[test]
    fn iteration_ceiling_bounds_the_run() {
        let cfg = LayoutConfig {
            max_iterations: 3,
            ..LayoutConfig::default()
        };
        let input: Vec<BubbleEntity> = (0..10)
            .map(|i| BubbleEntity::new(format!("E{i}"), 5.0, 5.0, 100.0 + f64::from(i) * 50.0))
            .collect();
        let (_, report) = resolve_with_report(input, &cfg);
        assert!(report.iterations <= 3);
    }

    #[test]
    fn random_small_layouts_resolve() {
        let cfg = LayoutConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let trials = 40;
        let mut resolved = 0;
        for _ in 0..trials {
            let n = rng.gen_range(2..=10);
            let input = random_entities(&mut rng, n);
            let (out, report) = resolve_with_report(input, &cfg);
            if overlapping_pairs(&out, &report, &cfg).is_empty() {
                resolved += 1;
            }
        }
        assert!(
            resolved * 100 >= trials * 95,
            "only {resolved}/{trials} layouts resolved"
        );
    }

    proptest! {
        #[test]
        fn positions_stay_in_domain(
            points in prop::collection::vec((-5.0f64..15.0, -5.0f64..15.0, 1.0f64..1_000.0), 0..10)
        ) {
            let cfg = LayoutConfig::default();
            let input: Vec<BubbleEntity> = points
                .iter()
                .enumerate()
                .map(|(i, (x, y, o))| BubbleEntity::new(format!("P{i}"), *x, *y, *o))
                .collect();
            let out = resolve(input, &cfg);
            for e in &out {
                prop_assert!((0.0..=10.0).contains(&e.cagr_index));
                prop_assert!((0.0..=10.0).contains(&e.market_share_index));
            }
        }
    }
}
