//! Tree-wide layout knobs.

use anyhow::{Context as _, ensure};
use serde::{Deserialize, Serialize};

/// Settings shared by every node created with them. Read-only during a layout pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Device pixels per layout unit. Zero disables pixel-grid rounding.
    pub point_scale_factor: f64,
    /// Default to `flex-direction: row` and `align-content: stretch`, and shrink items by default.
    pub use_web_defaults: bool,
    /// Keep sizing zero-flex containers to the available space instead of their content.
    pub use_legacy_stretch_behaviour: bool,
    /// Recompute flex bases on every pass instead of once per dirty cycle.
    pub experimental_web_flex_basis: bool,
    /// Relay a clone without the legacy stretch flag and record whether results differ.
    pub diff_legacy_stretch_behaviour: bool,
    /// Trace a dump of the laid out tree after each pass.
    pub print_tree: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            point_scale_factor: 1.0,
            use_web_defaults: false,
            use_legacy_stretch_behaviour: false,
            experimental_web_flex_basis: false,
            diff_legacy_stretch_behaviour: false,
            print_tree: false,
        }
    }
}

impl Config {
    /// Parse a JSON config object; missing keys take their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the scale factor is negative or not finite.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text).context("failed to parse layout config")?;
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric invariants of the config.
    ///
    /// # Errors
    /// Returns an error if the scale factor is negative or not finite.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.point_scale_factor.is_finite() && self.point_scale_factor >= 0.0,
            "point scale factor must be finite and non-negative, got {}",
            self.point_scale_factor
        );
        Ok(())
    }

    /// Set the scale factor; values within epsilon of zero disable rounding.
    pub fn set_point_scale_factor(&mut self, factor: f64) {
        assert!(
            factor >= 0.0,
            "Scale factor should not be less than zero"
        );
        self.point_scale_factor = if factor.abs() < f64::EPSILON { 0.0 } else { factor };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Missing keys fall back to the defaults.
    ///
    /// # Errors
    /// Returns an error if a partial config does not parse.
    fn partial_json_uses_defaults() -> anyhow::Result<()> {
        let config = Config::from_json(r#"{ "useWebDefaults": true }"#)?;
        assert!(config.use_web_defaults);
        assert!((config.point_scale_factor - 1.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    /// Negative scale factors are rejected at the boundary.
    ///
    /// # Panics
    /// Panics if a negative scale factor is accepted.
    fn rejects_negative_scale() {
        assert!(matches!(Config::from_json(r#"{ "pointScaleFactor": -2 }"#), Err(_)));
        assert!(matches!(Config::from_json("not json"), Err(_)));
    }
}
