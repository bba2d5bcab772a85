//! Tunable geometry for the bubble resolver.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or validating a [`LayoutConfig`].
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid layout config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("layout config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Resolver geometry. Every field has a default, so a YAML file only needs
/// the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Assumed plot width in pixels.
    pub plot_width_px: f64,
    /// Assumed plot height in pixels.
    pub plot_height_px: f64,
    /// Diameter of the smallest-opportunity bubble.
    pub min_diameter_px: f64,
    /// Diameter of the largest-opportunity bubble.
    pub max_diameter_px: f64,
    /// Diameter used when every opportunity is identical.
    pub default_diameter_px: f64,
    /// Required centre distance as a multiple of the summed radii.
    pub min_separation: f64,
    /// Fraction of an overlap corrected per adjustment, in `(0, 1]`.
    pub damping: f64,
    /// Pass ceiling; the resolver's only runtime bound.
    pub max_iterations: u32,
    /// Overlap below this many pixels counts as resolved.
    pub overlap_tolerance_px: f64,
    /// Lower bound of both display axes.
    pub domain_min: f64,
    /// Upper bound of both display axes.
    pub domain_max: f64,
    /// Observed axis ranges narrower than this fall back to the full domain.
    pub min_axis_span: f64,
    /// Seed for the angle used to split coincident bubbles.
    pub jitter_seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            plot_width_px: 600.0,
            plot_height_px: 400.0,
            min_diameter_px: 20.0,
            max_diameter_px: 80.0,
            default_diameter_px: 50.0,
            min_separation: 1.55,
            damping: 0.5,
            max_iterations: 200,
            overlap_tolerance_px: 0.5,
            domain_min: 0.0,
            domain_max: 10.0,
            min_axis_span: 1e-3,
            jitter_seed: 0x5EED_B0B0,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::Invalid {
            field,
            reason: "must be finite and > 0",
        })
    }
}

impl LayoutConfig {
    /// Parse YAML and validate the result.
    pub fn from_yaml_str(text: &str) -> Result<Self, LayoutError> {
        let config: LayoutConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        positive("plot_width_px", self.plot_width_px)?;
        positive("plot_height_px", self.plot_height_px)?;
        positive("min_diameter_px", self.min_diameter_px)?;
        positive("max_diameter_px", self.max_diameter_px)?;
        positive("default_diameter_px", self.default_diameter_px)?;
        positive("min_axis_span", self.min_axis_span)?;
        if self.min_diameter_px > self.max_diameter_px {
            return Err(LayoutError::Invalid {
                field: "min_diameter_px",
                reason: "must not exceed max_diameter_px",
            });
        }
        if !(self.min_separation.is_finite() && self.min_separation >= 1.0) {
            return Err(LayoutError::Invalid {
                field: "min_separation",
                reason: "must be finite and >= 1",
            });
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(LayoutError::Invalid {
                field: "damping",
                reason: "must be in (0, 1]",
            });
        }
        if self.max_iterations == 0 {
            return Err(LayoutError::Invalid {
                field: "max_iterations",
                reason: "must be > 0",
            });
        }
        if !(self.overlap_tolerance_px.is_finite() && self.overlap_tolerance_px >= 0.0) {
            return Err(LayoutError::Invalid {
                field: "overlap_tolerance_px",
                reason: "must be finite and >= 0",
            });
        }
        if !(self.domain_min.is_finite()
            && self.domain_max.is_finite()
            && self.domain_min < self.domain_max)
        {
            return Err(LayoutError::Invalid {
                field: "domain_min",
                reason: "must be finite and below domain_max",
            });
        }
        Ok(())
    }

    pub fn domain_span(&self) -> f64 {
        self.domain_max - self.domain_min
    }

    pub(crate) fn clamp_to_domain(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.domain_min, self.domain_max)
        } else {
            self.domain_min + self.domain_span() / 2.0
        }
    }
}
