//! Severity legend for the host page.

use crash_map_incident_models::Severity;
use crash_map_render::style::SeverityStyles;
use serde::Serialize;

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub severity: Severity,
    pub label: String,
    /// CSS `rgba()` fill.
    pub color: String,
}

/// Legend rows for every severity, most severe first.
#[must_use]
pub fn legend(styles: &SeverityStyles) -> Vec<LegendEntry> {
    Severity::all()
        .iter()
        .map(|&severity| LegendEntry {
            severity,
            label: severity.label().to_string(),
            color: styles.for_severity(severity).to_css(),
        })
        .collect()
}
