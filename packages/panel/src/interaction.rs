//! Hover state machine.
//!
//! Two states, [`HoverState::Idle`] and [`HoverState::Hovering`]. Pointer
//! events only read the spatial index; they never touch projected
//! positions.

use crash_map_incident_models::IncidentRecord;
use crash_map_spatial::{IndexEntry, SpatialIndex};

use crate::tooltip::Tooltip;

/// Which record, if any, is under the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum HoverState {
    #[default]
    Idle,
    /// The matched index entry: record index plus its projected position.
    Hovering(IndexEntry),
}

impl HoverState {
    /// Index of the hovered record.
    #[must_use]
    pub const fn record(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Hovering(entry) => Some(entry.record),
        }
    }

    /// Projected position of the hovered record, in panel pixels.
    #[must_use]
    pub const fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::Idle => None,
            Self::Hovering(entry) => Some((entry.x, entry.y)),
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Owns the hover state and the tooltip it drives.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: HoverState,
    tooltip: Tooltip,
    hover_radius: f64,
    tooltip_offset: f64,
}

impl InteractionController {
    #[must_use]
    pub fn new(hover_radius: f64, tooltip_offset: f64) -> Self {
        Self {
            state: HoverState::Idle,
            tooltip: Tooltip::default(),
            hover_radius,
            tooltip_offset,
        }
    }

    /// Handles a pointer move at panel coordinates `(x, y)`.
    ///
    /// Returns whether the raster layer needs repainting. A miss while
    /// already idle is a no-op.
    pub fn pointer_move(
        &mut self,
        index: &SpatialIndex,
        records: &[IncidentRecord],
        x: f64,
        y: f64,
    ) -> bool {
        let hit = index
            .query(x, y, self.hover_radius)
            .and_then(|entry| records.get(entry.record).map(|record| (entry, record)));

        match hit {
            Some((entry, record)) => {
                log::trace!("Pointer at ({x:.1}, {y:.1}) hovers record {}", record.id);
                self.state = HoverState::Hovering(entry);
                self.tooltip.show(record, x, y, self.tooltip_offset);
                true
            }
            None if self.state.is_idle() => false,
            None => {
                self.reset();
                true
            }
        }
    }

    /// Handles the pointer leaving the panel. Always requests a repaint.
    pub fn pointer_leave(&mut self) -> bool {
        self.reset();
        true
    }

    /// Returns to [`HoverState::Idle`] and hides the tooltip.
    pub fn reset(&mut self) {
        self.state = HoverState::Idle;
        self.tooltip.hide();
    }

    #[must_use]
    pub const fn state(&self) -> HoverState {
        self.state
    }

    #[must_use]
    pub const fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }
}
