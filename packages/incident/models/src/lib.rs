#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record types and severity definitions.
//!
//! An [`IncidentRecord`] is the immutable, source-side view of one crash.
//! Its panel-space position is derived state and lives separately as a
//! [`ProjectedPosition`], recomputed on every fit cycle by whoever owns the
//! layout.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder rendered for any optional attribute that is absent.
pub const UNAVAILABLE: &str = "Unavailable";

/// Crash severity, ordered from least to most severe.
///
/// The derived [`Ord`] follows declaration order, so
/// `PropertyDamageOnly < Injury < Fatal`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Severity {
    /// No injuries or deaths were reported.
    #[default]
    #[serde(alias = "pdo")]
    #[strum(to_string = "property-damage-only", serialize = "pdo")]
    PropertyDamageOnly,
    /// At least one person was injured.
    Injury,
    /// At least one person was killed.
    Fatal,
}

impl Severity {
    /// Human-readable label used by tooltips and the legend.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fatal => "Fatal",
            Self::Injury => "Injury",
            Self::PropertyDamageOnly => "Property damage only",
        }
    }

    /// Paint tier for the base raster pass. Lower tiers are painted first,
    /// so higher tiers composite on top.
    #[must_use]
    pub const fn paint_tier(self) -> u8 {
        match self {
            Self::PropertyDamageOnly => 0,
            Self::Injury => 1,
            Self::Fatal => 2,
        }
    }

    /// Returns all variants, most severe first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Fatal, Self::Injury, Self::PropertyDamageOnly]
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPosition {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// One geocoded crash as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Opaque source identifier (e.g. a collision ID).
    pub id: String,
    /// Source position, `None` when missing or malformed.
    pub position: Option<GeoPosition>,
    /// Severity category.
    pub severity: Severity,
    /// Administrative region (e.g. borough) name.
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Hour of day, 0-23.
    pub hour_of_day: Option<u8>,
    /// Day of week, 0-6 with 0 = Sunday.
    pub day_of_week: Option<u8>,
}

impl IncidentRecord {
    /// Creates a record with no position and no optional attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            position: None,
            severity,
            region: None,
            postal_code: None,
            hour_of_day: None,
            day_of_week: None,
        }
    }

    /// Sets the source position.
    #[must_use]
    pub const fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = Some(GeoPosition {
            latitude,
            longitude,
        });
        self
    }

    /// Human-readable day name, or [`UNAVAILABLE`].
    #[must_use]
    pub fn day_label(&self) -> String {
        self.day_of_week
            .and_then(day_name)
            .map_or_else(|| UNAVAILABLE.to_string(), str::to_string)
    }

    /// 12-hour clock label (e.g. `"3 PM"`), or [`UNAVAILABLE`].
    #[must_use]
    pub fn hour_label(&self) -> String {
        self.hour_of_day
            .and_then(hour_label)
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    }
}

/// Panel-space position derived from an [`IncidentRecord`] by the current
/// projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ProjectedPosition {
    /// Finite panel coordinates in CSS pixels.
    At {
        /// Horizontal offset from the panel's left edge.
        x: f64,
        /// Vertical offset from the panel's top edge.
        y: f64,
    },
    /// Source position missing or outside the projection domain.
    #[default]
    Unprojectable,
}

impl ProjectedPosition {
    /// Builds a position from raw coordinates, collapsing non-finite
    /// results to [`ProjectedPosition::Unprojectable`].
    #[must_use]
    pub const fn from_xy(x: f64, y: f64) -> Self {
        if x.is_finite() && y.is_finite() {
            Self::At { x, y }
        } else {
            Self::Unprojectable
        }
    }

    /// Returns the coordinates when projectable.
    #[must_use]
    pub const fn point(self) -> Option<(f64, f64)> {
        match self {
            Self::At { x, y } => Some((x, y)),
            Self::Unprojectable => None,
        }
    }

    #[must_use]
    pub const fn is_projectable(self) -> bool {
        matches!(self, Self::At { .. })
    }
}

/// Sunday-based day name for a day-of-week index.
#[must_use]
pub const fn day_name(day: u8) -> Option<&'static str> {
    match day {
        0 => Some("Sunday"),
        1 => Some("Monday"),
        2 => Some("Tuesday"),
        3 => Some("Wednesday"),
        4 => Some("Thursday"),
        5 => Some("Friday"),
        6 => Some("Saturday"),
        _ => None,
    }
}

/// Formats an hour of day on a 12-hour clock (`0` -> `"12 AM"`).
#[must_use]
pub fn hour_label(hour: u8) -> Option<String> {
    NaiveTime::from_hms_opt(u32::from(hour), 0, 0).map(|t| t.format("%-I %p").to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn severity_parses_long_and_short_forms() {
        assert_eq!(Severity::from_str("fatal").unwrap(), Severity::Fatal);
        assert_eq!(Severity::from_str("Injury").unwrap(), Severity::Injury);
        assert_eq!(
            Severity::from_str("property-damage-only").unwrap(),
            Severity::PropertyDamageOnly
        );
        assert_eq!(
            Severity::from_str("pdo").unwrap(),
            Severity::PropertyDamageOnly
        );
        assert!(Severity::from_str("minor").is_err());
    }

    #[test]
    fn severity_display_uses_canonical_name() {
        assert_eq!(
            Severity::PropertyDamageOnly.to_string(),
            "property-damage-only"
        );
        assert_eq!(Severity::Fatal.as_ref(), "fatal");
    }

    #[test]
    fn severity_tiers_follow_ordering() {
        assert!(Severity::Fatal > Severity::Injury);
        assert!(Severity::Injury > Severity::PropertyDamageOnly);
        for pair in Severity::all().windows(2) {
            assert!(pair[0].paint_tier() > pair[1].paint_tier());
        }
    }

    #[test]
    fn hour_labels_use_twelve_hour_clock() {
        assert_eq!(hour_label(0).as_deref(), Some("12 AM"));
        assert_eq!(hour_label(9).as_deref(), Some("9 AM"));
        assert_eq!(hour_label(12).as_deref(), Some("12 PM"));
        assert_eq!(hour_label(23).as_deref(), Some("11 PM"));
        assert!(hour_label(24).is_none());
    }

    #[test]
    fn day_names_start_on_sunday() {
        assert_eq!(day_name(0), Some("Sunday"));
        assert_eq!(day_name(6), Some("Saturday"));
        assert!(day_name(7).is_none());
    }

    #[test]
    fn missing_temporal_fields_render_placeholder() {
        let record = IncidentRecord::new("42", Severity::Injury);
        assert_eq!(record.day_label(), UNAVAILABLE);
        assert_eq!(record.hour_label(), UNAVAILABLE);
    }

    #[test]
    fn non_finite_projection_is_unprojectable() {
        assert_eq!(
            ProjectedPosition::from_xy(f64::NAN, 1.0),
            ProjectedPosition::Unprojectable
        );
        assert_eq!(
            ProjectedPosition::from_xy(1.0, f64::INFINITY),
            ProjectedPosition::Unprojectable
        );
        assert_eq!(ProjectedPosition::from_xy(1.0, 2.0).point(), Some((1.0, 2.0)));
    }
}
