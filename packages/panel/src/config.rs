//! Panel configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration.

use std::path::Path;

use crash_map_render::style::{Color, OutlineStyle, RasterStyle};
use serde::{Deserialize, Serialize};

use crate::PanelError;

/// Tunable constants for one map panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Hover search radius in CSS pixels. A record is hovered only if it is
    /// strictly closer than this to the pointer.
    pub hover_radius_px: f64,
    /// Offset of the tooltip's top-left corner from the pointer.
    pub tooltip_offset_px: f64,
    /// Feature property used to name boundaries.
    pub boundary_name_property: String,
    /// Point and highlight styles.
    pub style: RasterStyle,
    /// Boundary outline stroke.
    pub outline: OutlineStyle,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            hover_radius_px: 10.0,
            tooltip_offset_px: 12.0,
            boundary_name_property: "name".to_string(),
            style: RasterStyle::default(),
            outline: OutlineStyle::default(),
        }
    }
}

impl PanelConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] if the TOML is invalid or a value is
    /// out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, PanelError> {
        let config: Self = toml::from_str(text).map_err(|e| PanelError::Config {
            message: format!("invalid panel config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] if the file cannot be read or fails
    /// [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, PanelError> {
        let text = std::fs::read_to_string(path).map_err(|e| PanelError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that radii are positive and colors have a 0-1 alpha.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), PanelError> {
        let positive = [
            ("hover_radius_px", self.hover_radius_px),
            ("style.point_radius_px", self.style.point_radius_px),
            ("style.highlight.ring_radius_px", self.style.highlight.ring_radius_px),
            ("style.highlight.ring_width_px", self.style.highlight.ring_width_px),
            ("style.highlight.dot_radius_px", self.style.highlight.dot_radius_px),
            ("outline.stroke_width_px", self.outline.stroke_width_px),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PanelError::Config {
                    message: format!("{name} must be a positive number, got {value}"),
                });
            }
        }

        if !self.tooltip_offset_px.is_finite() {
            return Err(PanelError::Config {
                message: "tooltip_offset_px must be finite".to_string(),
            });
        }

        let colors: [(&str, Color); 5] = [
            ("style.severities.fatal", self.style.severities.fatal),
            ("style.severities.injury", self.style.severities.injury),
            (
                "style.severities.property_damage_only",
                self.style.severities.property_damage_only,
            ),
            ("style.highlight.color", self.style.highlight.color),
            ("outline.stroke", self.outline.stroke),
        ];
        for (name, color) in colors {
            if !color.is_valid() {
                return Err(PanelError::Config {
                    message: format!("{name} alpha must be within 0-1, got {}", color.a),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PanelConfig::from_toml_str("").unwrap();
        assert_eq!(config, PanelConfig::default());
        assert!((config.hover_radius_px - 10.0).abs() < f64::EPSILON);
        assert!((config.style.point_radius_px - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = PanelConfig::from_toml_str(
            r#"
hover_radius_px = 6.0
boundary_name_property = "boro_name"

[style]
point_radius_px = 1.5

[style.severities.fatal]
r = 255
g = 0
b = 0
a = 1.0
"#,
        )
        .unwrap();

        assert!((config.hover_radius_px - 6.0).abs() < f64::EPSILON);
        assert_eq!(config.boundary_name_property, "boro_name");
        assert!((config.style.point_radius_px - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.style.severities.fatal, Color::rgba(255, 0, 0, 1.0));
        assert_eq!(
            config.style.severities.injury,
            RasterStyle::default().severities.injury
        );
        assert!((config.tooltip_offset_px - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_positive_radius() {
        let err = PanelConfig::from_toml_str("hover_radius_px = 0.0").unwrap_err();
        assert!(err.to_string().contains("hover_radius_px"));
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        let err = PanelConfig::from_toml_str(
            "[style.highlight.color]\nr = 0\ng = 0\nb = 255\na = 2.0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("style.highlight.color"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = PanelConfig::from_toml_str("hover_radius_px = ").unwrap_err();
        assert!(matches!(err, PanelError::Config { .. }));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = PanelConfig::load(Path::new("/nonexistent/panel.toml")).unwrap_err();
        assert!(err.to_string().contains("panel.toml"));
    }
}
