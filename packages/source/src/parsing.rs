//! Field coercion shared by the incident loaders.
//!
//! Malformed values never reject a row: every helper here returns `None`
//! (or the default severity) and lets the row through.

use std::str::FromStr;

use crash_map_incident_models::{GeoPosition, Severity};

/// Parses lat/lng from optional string fields. Returns `None` if missing,
/// unparseable, non-finite, out of range, or zero.
#[must_use]
pub fn parse_lat_lng_str(lat: Option<&str>, lng: Option<&str>) -> Option<GeoPosition> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lng?.trim().parse::<f64>().ok()?;
    parse_lat_lng_f64(Some(latitude), Some(longitude))
}

/// Validates lat/lng from optional f64 fields. Returns `None` if missing,
/// non-finite, out of range, or zero.
#[must_use]
pub fn parse_lat_lng_f64(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPosition> {
    let latitude = lat?;
    let longitude = lng?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some(GeoPosition {
        latitude,
        longitude,
    })
}

/// Parses a small non-negative integer no greater than `max`.
///
/// Accepts integral decimal forms such as `"7.0"`.
#[must_use]
pub fn parse_bounded_u8(value: Option<&str>, max: u8) -> Option<u8> {
    let parsed = value?.trim().parse::<f64>().ok()?;
    if parsed.fract() != 0.0 || parsed < 0.0 || parsed > f64::from(max) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(parsed as u8)
}

/// Parses a severity label, falling back to property-damage-only for
/// missing or unknown values.
#[must_use]
pub fn parse_severity(value: Option<&str>) -> Severity {
    value
        .map(str::trim)
        .and_then(|s| Severity::from_str(s).ok())
        .unwrap_or_default()
}

/// Trims a text field, mapping empty values to `None`.
#[must_use]
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
