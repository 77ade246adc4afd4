#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crash map panel.
//!
//! [`MapPanel`] owns everything a mounted panel needs: the loaded
//! boundaries and incident records, the current fit (projection, projected
//! positions, spatial index), both render layers, and the hover controller.
//!
//! Fit cycles are the only operations that replace projected positions or
//! the index. Each cycle builds the new state off to the side and swaps it
//! in whole, so pointer events always query a consistent fit. Pointer
//! events that arrive before the first completed fit are ignored.

pub mod config;
pub mod interaction;
pub mod legend;
pub mod tooltip;

use crash_map_boundary_models::BoundaryCollection;
use crash_map_incident_models::{GeoPosition, IncidentRecord, ProjectedPosition};
use crash_map_render::projection::{Projection, fit_size, project_records, projected_extent};
use crash_map_render::raster::{RasterLayer, RasterPoint};
use crash_map_render::vector::VectorLayer;
use crash_map_render::{FitError, PanelSize, RenderError};
use crash_map_source::{GeometrySource, SourceError};
use crash_map_spatial::{IndexEntry, SpatialIndex};
use serde::Serialize;

use crate::config::PanelConfig;
use crate::interaction::{HoverState, InteractionController};
use crate::legend::LegendEntry;
use crate::tooltip::Tooltip;

/// Errors surfaced by the panel.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Boundary or incident data could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The projection could not be fitted.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// The raster buffer could not be allocated.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Invalid panel configuration.
    #[error("{message}")]
    Config {
        /// Description naming the offending setting.
        message: String,
    },
}

impl PanelError {
    /// Whether this is the "panel has no size yet" condition, which is
    /// skipped quietly and retried on the next resize.
    #[must_use]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::Fit(FitError::NotReady { .. }))
    }
}

/// Host events the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    /// The panel was laid out or changed size.
    Resize(PanelSize),
    /// The pointer moved to panel-local coordinates.
    PointerMove { x: f64, y: f64 },
    /// The pointer left the panel.
    PointerLeave,
}

/// Which layers changed as a result of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    /// Only the raster layer (and tooltip) changed.
    Raster,
    /// Both layers were re-rendered by a fit cycle.
    Full,
}

/// Counts from one completed fit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitSummary {
    pub records: usize,
    pub projectable: usize,
    pub indexed: usize,
    pub boundary_paths: usize,
}

/// Outputs of the most recent completed fit cycle.
#[derive(Debug)]
struct FitState {
    size: PanelSize,
    projection: Projection,
    projected: Vec<ProjectedPosition>,
    points: Vec<RasterPoint>,
    index: SpatialIndex,
    summary: FitSummary,
}

/// A mounted crash map panel.
#[derive(Debug)]
pub struct MapPanel {
    config: PanelConfig,
    boundaries: BoundaryCollection,
    records: Vec<IncidentRecord>,
    fit: Option<FitState>,
    vector: VectorLayer,
    raster: RasterLayer,
    controller: InteractionController,
}

impl MapPanel {
    /// Loads boundaries and incidents from `source` and runs the first fit
    /// cycle at `size`.
    ///
    /// A panel that is not laid out yet still mounts, provided its geometry
    /// can be fitted; its first fit happens on the next [`Self::resize`].
    ///
    /// # Errors
    ///
    /// Any load failure, invalid configuration, unfittable geometry, or
    /// oversized raster aborts initialization. The failure is logged once
    /// and no panel is returned.
    pub fn mount(
        source: &impl GeometrySource,
        config: PanelConfig,
        size: PanelSize,
    ) -> Result<Self, PanelError> {
        Self::try_mount(source, config, size).inspect_err(|e| {
            log::error!("Failed to initialize map panel: {e}");
        })
    }

    fn try_mount(
        source: &impl GeometrySource,
        config: PanelConfig,
        size: PanelSize,
    ) -> Result<Self, PanelError> {
        let boundaries = source.load_boundaries()?;
        let records = source.load_incidents()?;
        let mut panel = Self::new(boundaries, records, config)?;

        match panel.resize(size) {
            Ok(_) => {}
            Err(e) if e.is_not_ready() => {
                log::debug!("Panel mounted before layout, deferring first fit: {e}");
            }
            Err(e) => return Err(e),
        }

        Ok(panel)
    }

    /// Creates an unfitted panel over already-loaded data.
    ///
    /// # Errors
    ///
    /// * [`PanelError::Config`] if `config` fails validation.
    /// * [`PanelError::Fit`] if the boundaries have no fittable extent at
    ///   any panel size.
    pub fn new(
        boundaries: BoundaryCollection,
        records: Vec<IncidentRecord>,
        config: PanelConfig,
    ) -> Result<Self, PanelError> {
        config.validate()?;
        projected_extent(&boundaries)?;

        Ok(Self {
            vector: VectorLayer::new(config.outline),
            raster: RasterLayer::new(),
            controller: InteractionController::new(
                config.hover_radius_px,
                config.tooltip_offset_px,
            ),
            config,
            boundaries,
            records,
            fit: None,
        })
    }

    /// Runs a full fit cycle at `size`: fit the projection, clear hover,
    /// re-project every record, rebuild the index, and re-render both
    /// layers.
    ///
    /// Safe to call repeatedly with the same size.
    ///
    /// # Errors
    ///
    /// * [`FitError::NotReady`] if `size` has a zero or invalid dimension.
    /// * Other [`FitError`]s if the boundaries cannot be fitted.
    /// * [`RenderError::BufferTooLarge`] if the raster would be too big.
    ///
    /// On error nothing changes, including hover state.
    pub fn resize(&mut self, size: PanelSize) -> Result<FitSummary, PanelError> {
        let projection = fit_size(size, &self.boundaries)?;
        size.physical_dimensions()?;

        self.controller.reset();

        let projected = project_records(&projection, &self.records);

        let entries: Vec<IndexEntry> = projected
            .iter()
            .enumerate()
            .filter_map(|(i, position)| position.point().map(|(x, y)| IndexEntry::new(i, x, y)))
            .collect();

        let points: Vec<RasterPoint> = entries
            .iter()
            .map(|entry| RasterPoint::new(entry.x, entry.y, self.records[entry.record].severity))
            .collect();

        let projectable = entries.len();
        let index = SpatialIndex::from_entries(entries);

        self.raster.resize(size)?;
        self.vector.render(&projection, &self.boundaries, size);

        let summary = FitSummary {
            records: self.records.len(),
            projectable,
            indexed: index.len(),
            boundary_paths: self.vector.paths().len(),
        };

        self.fit = Some(FitState {
            size,
            projection,
            projected,
            points,
            index,
            summary,
        });
        self.repaint();

        log::info!(
            "Fit cycle at {}x{}: {} records, {} indexed, {} boundary paths",
            size.width,
            size.height,
            summary.records,
            summary.indexed,
            summary.boundary_paths,
        );
        log::debug!(
            "{} records were unprojectable",
            summary.records - summary.projectable
        );

        Ok(summary)
    }

    /// Handles a pointer move at panel coordinates `(x, y)`.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Redraw {
        let Some(fit) = &self.fit else {
            log::trace!("Ignoring pointer move before first fit");
            return Redraw::None;
        };

        if self
            .controller
            .pointer_move(&fit.index, &self.records, x, y)
        {
            self.repaint();
            Redraw::Raster
        } else {
            Redraw::None
        }
    }

    /// Handles the pointer leaving the panel.
    pub fn pointer_leave(&mut self) -> Redraw {
        if self.fit.is_none() {
            return Redraw::None;
        }

        self.controller.pointer_leave();
        self.repaint();
        Redraw::Raster
    }

    /// Dispatches a host event.
    ///
    /// Failed resizes are logged and leave the panel unchanged.
    pub fn handle(&mut self, event: PanelEvent) -> Redraw {
        match event {
            PanelEvent::Resize(size) => match self.resize(size) {
                Ok(_) => Redraw::Full,
                Err(e) if e.is_not_ready() => {
                    log::debug!("Skipping fit cycle: {e}");
                    Redraw::None
                }
                Err(e) => {
                    log::warn!("Fit cycle aborted, keeping previous layout: {e}");
                    Redraw::None
                }
            },
            PanelEvent::PointerMove { x, y } => self.pointer_move(x, y),
            PanelEvent::PointerLeave => self.pointer_leave(),
        }
    }

    /// Repaints the raster layer from the current fit and hover state.
    pub fn repaint(&mut self) {
        let Some(fit) = &self.fit else {
            return;
        };
        self.raster.paint(
            &fit.points,
            self.controller.state().position(),
            &self.config.style,
        );
    }

    /// Whether a fit cycle has completed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.fit.is_some()
    }

    /// Counts from the last completed fit.
    #[must_use]
    pub fn fit_summary(&self) -> Option<FitSummary> {
        self.fit.as_ref().map(|fit| fit.summary)
    }

    /// Size of the last completed fit.
    #[must_use]
    pub fn size(&self) -> Option<PanelSize> {
        self.fit.as_ref().map(|fit| fit.size)
    }

    #[must_use]
    pub fn projection(&self) -> Option<&Projection> {
        self.fit.as_ref().map(|fit| &fit.projection)
    }

    /// Geographic position under panel coordinates `(x, y)`, using the
    /// current fit.
    #[must_use]
    pub fn location_at(&self, x: f64, y: f64) -> Option<GeoPosition> {
        let (longitude, latitude) = self.projection()?.invert(x, y);
        (longitude.is_finite() && latitude.is_finite()).then_some(GeoPosition {
            latitude,
            longitude,
        })
    }

    /// Projected position of every record, in record order. Empty before
    /// the first fit.
    #[must_use]
    pub fn projected_positions(&self) -> &[ProjectedPosition] {
        self.fit.as_ref().map_or(&[], |fit| &fit.projected)
    }

    #[must_use]
    pub fn index(&self) -> Option<&SpatialIndex> {
        self.fit.as_ref().map(|fit| &fit.index)
    }

    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    #[must_use]
    pub const fn boundaries(&self) -> &BoundaryCollection {
        &self.boundaries
    }

    #[must_use]
    pub const fn config(&self) -> &PanelConfig {
        &self.config
    }

    #[must_use]
    pub const fn hover_state(&self) -> HoverState {
        self.controller.state()
    }

    /// The hovered record, if any.
    #[must_use]
    pub fn hovered_record(&self) -> Option<&IncidentRecord> {
        self.hover_state()
            .record()
            .and_then(|i| self.records.get(i))
    }

    #[must_use]
    pub const fn tooltip(&self) -> &Tooltip {
        self.controller.tooltip()
    }

    #[must_use]
    pub const fn vector_layer(&self) -> &VectorLayer {
        &self.vector
    }

    #[must_use]
    pub const fn raster_layer(&self) -> &RasterLayer {
        &self.raster
    }

    /// Severity legend using the configured colors.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        legend::legend(&self.config.style.severities)
    }
}
