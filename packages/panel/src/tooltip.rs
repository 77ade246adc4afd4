//! Tooltip overlay model.
//!
//! The panel does not draw the tooltip itself; it keeps the overlay's
//! visibility, position, and text so the host can present it.

use std::fmt;

use crash_map_incident_models::{IncidentRecord, UNAVAILABLE};
use serde::Serialize;

/// Text shown for one hovered record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipContent {
    /// Heading, e.g. `"Crash 4455765"`.
    pub title: String,
    pub severity: String,
    pub region: String,
    pub postal_code: String,
    /// Day name, e.g. `"Tuesday"`.
    pub day: String,
    /// 12-hour clock hour, e.g. `"9 AM"`.
    pub hour: String,
}

impl TooltipContent {
    #[must_use]
    pub fn from_record(record: &IncidentRecord) -> Self {
        let or_unavailable =
            |value: Option<&String>| value.map_or_else(|| UNAVAILABLE.to_string(), Clone::clone);

        Self {
            title: format!("Crash {}", record.id),
            severity: record.severity.label().to_string(),
            region: or_unavailable(record.region.as_ref()),
            postal_code: or_unavailable(record.postal_code.as_ref()),
            day: record.day_label(),
            hour: record.hour_label(),
        }
    }

    /// Labelled detail rows below the title.
    #[must_use]
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Severity", &self.severity),
            ("Region", &self.region),
            ("Postal code", &self.postal_code),
            ("Day", &self.day),
            ("Hour", &self.hour),
        ]
    }
}

impl fmt::Display for TooltipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for (label, value) in self.rows() {
            write!(f, "\n{label}: {value}")?;
        }
        Ok(())
    }
}

/// Tooltip overlay state: hidden, or shown at a panel position with content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    visible: bool,
    left: f64,
    top: f64,
    content: Option<TooltipContent>,
}

impl Tooltip {
    /// Shows the tooltip for `record`, offset from the pointer at
    /// `(pointer_x, pointer_y)`.
    pub fn show(&mut self, record: &IncidentRecord, pointer_x: f64, pointer_y: f64, offset: f64) {
        self.visible = true;
        self.left = pointer_x + offset;
        self.top = pointer_y + offset;
        self.content = Some(TooltipContent::from_record(record));
    }

    pub fn hide(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Top-left corner in panel pixels, when visible.
    #[must_use]
    pub const fn position(&self) -> Option<(f64, f64)> {
        if self.visible {
            Some((self.left, self.top))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crash_map_incident_models::Severity;

    use super::*;

    fn record() -> IncidentRecord {
        IncidentRecord {
            region: Some("BROOKLYN".to_string()),
            postal_code: Some("11208".to_string()),
            hour_of_day: Some(15),
            day_of_week: Some(2),
            ..IncidentRecord::new("4455765", Severity::Fatal)
        }
    }

    #[test]
    fn content_uses_readable_labels() {
        let content = TooltipContent::from_record(&record());
        assert_eq!(content.title, "Crash 4455765");
        assert_eq!(content.severity, "Fatal");
        assert_eq!(content.region, "BROOKLYN");
        assert_eq!(content.postal_code, "11208");
        assert_eq!(content.day, "Tuesday");
        assert_eq!(content.hour, "3 PM");
    }

    #[test]
    fn absent_fields_show_placeholder() {
        let content =
            TooltipContent::from_record(&IncidentRecord::new("7", Severity::PropertyDamageOnly));
        assert_eq!(content.severity, "Property damage only");
        for (_, value) in content.rows().iter().skip(1) {
            assert_eq!(*value, UNAVAILABLE);
        }
    }

    #[test]
    fn display_lists_every_row() {
        let text = TooltipContent::from_record(&record()).to_string();
        assert_eq!(
            text,
            "Crash 4455765\nSeverity: Fatal\nRegion: BROOKLYN\nPostal code: 11208\nDay: Tuesday\nHour: 3 PM"
        );
    }

    #[test]
    fn show_offsets_from_pointer_and_hide_clears() {
        let mut tooltip = Tooltip::default();
        assert!(!tooltip.is_visible());

        tooltip.show(&record(), 100.0, 50.0, 12.0);
        assert_eq!(tooltip.position(), Some((112.0, 62.0)));
        assert!(tooltip.content().is_some());

        tooltip.hide();
        assert!(!tooltip.is_visible());
        assert!(tooltip.position().is_none());
        assert!(tooltip.content().is_none());
    }
}
