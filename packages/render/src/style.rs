//! Visual styles for both layers.
//!
//! Defaults paint fatal crashes in strong red, injuries in semi-transparent
//! amber, and property-damage-only crashes as a faint slate wash so volume
//! never hides the severe events.

use crash_map_incident_models::Severity;
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color with 8-bit channels and a 0-1 alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Whether alpha lies in `0.0..=1.0`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.a)
    }

    /// CSS `rgba()` notation.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Fill color for each severity category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityStyles {
    pub fatal: Color,
    pub injury: Color,
    pub property_damage_only: Color,
}

impl Default for SeverityStyles {
    fn default() -> Self {
        Self {
            fatal: Color::rgba(220, 38, 38, 0.9),
            injury: Color::rgba(245, 158, 11, 0.6),
            property_damage_only: Color::rgba(31, 41, 55, 0.15),
        }
    }
}

impl SeverityStyles {
    #[must_use]
    pub const fn for_severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Fatal => self.fatal,
            Severity::Injury => self.injury,
            Severity::PropertyDamageOnly => self.property_damage_only,
        }
    }
}

/// Hover marker: an outlined ring with a filled center dot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub color: Color,
    pub ring_radius_px: f64,
    pub ring_width_px: f64,
    pub dot_radius_px: f64,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color::rgba(37, 99, 235, 0.9),
            ring_radius_px: 4.0,
            ring_width_px: 2.0,
            dot_radius_px: 2.0,
        }
    }
}

/// Everything the point rasterizer needs to paint a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterStyle {
    /// Radius of every base point, in CSS pixels.
    pub point_radius_px: f64,
    pub severities: SeverityStyles,
    pub highlight: HighlightStyle,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            point_radius_px: 0.8,
            severities: SeverityStyles::default(),
            highlight: HighlightStyle::default(),
        }
    }
}

/// Stroke for boundary outlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineStyle {
    pub stroke: Color,
    pub stroke_width_px: f64,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            stroke: Color::rgba(75, 85, 99, 1.0),
            stroke_width_px: 0.75,
        }
    }
}
