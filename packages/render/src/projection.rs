//! Spherical Mercator projection fitted to the panel.
//!
//! [`fit_size`] is a pure function of panel size and boundary geometry: it
//! measures the projected extent of every boundary vertex at unit scale and
//! picks the largest uniform scale that fits that extent inside the panel,
//! centered on both axes.

use std::f64::consts::FRAC_PI_4;

use crash_map_boundary_models::BoundaryCollection;
use crash_map_incident_models::{GeoPosition, IncidentRecord, ProjectedPosition};

use crate::{FitError, PanelSize};

/// Unit Mercator: longitude/latitude in degrees to radians-based plane
/// coordinates with y growing southward. `None` outside the domain.
fn mercator(longitude: f64, latitude: f64) -> Option<(f64, f64)> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return None;
    }
    if !(-180.0..=180.0).contains(&longitude) || latitude.abs() >= 90.0 {
        return None;
    }

    let x = longitude.to_radians();
    let y = -(FRAC_PI_4 + latitude.to_radians() / 2.0).tan().ln();

    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Mercator projection with a uniform scale and a pixel translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

impl Projection {
    /// Pixels per unit of projected plane.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Pixel position of the projected origin (0° longitude, equator).
    #[must_use]
    pub const fn translate(&self) -> (f64, f64) {
        (self.translate_x, self.translate_y)
    }

    /// Projects `(longitude, latitude)` in degrees to panel pixels.
    ///
    /// Returns `None` for non-finite input, longitudes outside ±180°, or
    /// latitudes at or beyond the poles.
    #[must_use]
    pub fn project(&self, longitude: f64, latitude: f64) -> Option<(f64, f64)> {
        let (ux, uy) = mercator(longitude, latitude)?;
        let x = self.scale.mul_add(ux, self.translate_x);
        let y = self.scale.mul_add(uy, self.translate_y);
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    /// Projects an optional source position.
    #[must_use]
    pub fn project_position(&self, position: Option<GeoPosition>) -> ProjectedPosition {
        position
            .and_then(|p| self.project(p.longitude, p.latitude))
            .map_or(ProjectedPosition::Unprojectable, |(x, y)| {
                ProjectedPosition::from_xy(x, y)
            })
    }

    /// Maps panel pixels back to `(longitude, latitude)` in degrees.
    #[must_use]
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let ux = (x - self.translate_x) / self.scale;
        let uy = (y - self.translate_y) / self.scale;
        let longitude = ux.to_degrees();
        let latitude = (2.0 * (-uy).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
        (longitude, latitude)
    }
}

/// Unit-scale Mercator extent `[min_x, min_y, max_x, max_y]` of every
/// projectable boundary vertex.
///
/// Independent of panel size, so geometry can be checked before the panel
/// is laid out.
///
/// # Errors
///
/// * [`FitError::EmptyGeometry`] if no boundary vertex is projectable.
/// * [`FitError::DegenerateExtent`] if all vertices coincide.
pub fn projected_extent(boundaries: &BoundaryCollection) -> Result<[f64; 4], FitError> {
    let mut bounds: Option<[f64; 4]> = None;
    for coord in boundaries.coords() {
        let Some((x, y)) = mercator(coord.x, coord.y) else {
            continue;
        };
        bounds = Some(match bounds {
            None => [x, y, x, y],
            Some([x0, y0, x1, y1]) => [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
        });
    }

    let extent = bounds.ok_or(FitError::EmptyGeometry)?;
    let [x0, y0, x1, y1] = extent;
    if x1 - x0 <= 0.0 && y1 - y0 <= 0.0 {
        return Err(FitError::DegenerateExtent);
    }
    Ok(extent)
}

/// Fits a projection so the boundary extent is centered in the panel and
/// scaled to fill it while preserving aspect ratio.
///
/// # Errors
///
/// * [`FitError::NotReady`] if the panel has a zero or invalid dimension.
/// * Any error from [`projected_extent`].
pub fn fit_size(size: PanelSize, boundaries: &BoundaryCollection) -> Result<Projection, FitError> {
    if !size.is_laid_out() {
        return Err(FitError::NotReady {
            width: size.width,
            height: size.height,
        });
    }

    let [x0, y0, x1, y1] = projected_extent(boundaries)?;
    let (dx, dy) = (x1 - x0, y1 - y0);

    let scale = match (dx > 0.0, dy > 0.0) {
        (true, true) => (size.width / dx).min(size.height / dy),
        (true, false) => size.width / dx,
        (false, _) => size.height / dy,
    };

    let translate_x = scale.mul_add(-(x0 + x1) / 2.0, size.width / 2.0);
    let translate_y = scale.mul_add(-(y0 + y1) / 2.0, size.height / 2.0);

    log::debug!(
        "Fitted projection to {}x{}: scale={scale:.3}, translate=({translate_x:.3}, {translate_y:.3})",
        size.width,
        size.height
    );

    Ok(Projection {
        scale,
        translate_x,
        translate_y,
    })
}

/// Projects every record, in record order.
///
/// The output has exactly one entry per record; records without a usable
/// position map to [`ProjectedPosition::Unprojectable`].
#[must_use]
pub fn project_records(
    projection: &Projection,
    records: &[IncidentRecord],
) -> Vec<ProjectedPosition> {
    records
        .iter()
        .map(|record| projection.project_position(record.position))
        .collect()
}

#[cfg(test)]
mod tests {
    use crash_map_boundary_models::BoundaryFeature;
    use crash_map_incident_models::Severity;
    use geo::polygon;

    use super::*;

    fn nyc_box() -> BoundaryCollection {
        BoundaryCollection::new(vec![BoundaryFeature::from_polygon(
            "box",
            polygon![
                (x: -74.25, y: 40.50),
                (x: -73.70, y: 40.50),
                (x: -73.70, y: 40.92),
                (x: -74.25, y: 40.92),
                (x: -74.25, y: 40.50),
            ],
        )])
    }

    #[test]
    fn zero_size_is_not_ready() {
        let err = fit_size(PanelSize::new(0.0, 400.0), &nyc_box()).unwrap_err();
        assert!(matches!(err, FitError::NotReady { .. }));
    }

    #[test]
    fn empty_geometry_cannot_be_fitted() {
        let err = fit_size(PanelSize::new(400.0, 400.0), &BoundaryCollection::default());
        assert_eq!(err.unwrap_err(), FitError::EmptyGeometry);
    }

    #[test]
    fn single_vertex_extent_is_degenerate() {
        let collection = BoundaryCollection::new(vec![BoundaryFeature::from_polygon(
            "dot",
            polygon![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 1.0)],
        )]);
        let err = fit_size(PanelSize::new(400.0, 400.0), &collection);
        assert_eq!(err.unwrap_err(), FitError::DegenerateExtent);
    }

    #[test]
    fn extent_is_checked_without_a_panel_size() {
        assert_eq!(
            projected_extent(&BoundaryCollection::default()).unwrap_err(),
            FitError::EmptyGeometry
        );

        let [x0, y0, x1, y1] = projected_extent(&nyc_box()).unwrap();
        assert!(x1 > x0 && y1 > y0);
    }

    #[test]
    fn extent_is_centered_and_fills_limiting_axis() {
        let size = PanelSize::new(800.0, 600.0);
        let projection = fit_size(size, &nyc_box()).unwrap();

        let (left, bottom) = projection.project(-74.25, 40.50).unwrap();
        let (right, top) = projection.project(-73.70, 40.92).unwrap();

        let width = right - left;
        let height = bottom - top;
        let fills_width = (width - 800.0).abs() < 1e-6;
        let fills_height = (height - 600.0).abs() < 1e-6;
        assert!(fills_width || fills_height);
        assert!(width <= 800.0 + 1e-6 && height <= 600.0 + 1e-6);

        assert!(((left + right) / 2.0 - 400.0).abs() < 1e-6);
        assert!(((top + bottom) / 2.0 - 300.0).abs() < 1e-6);
        assert!(top < bottom, "north should be up");
    }

    #[test]
    fn fitting_is_deterministic() {
        let size = PanelSize::new(640.0, 480.0);
        let a = fit_size(size, &nyc_box()).unwrap();
        let b = fit_size(size, &nyc_box()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.project(-73.95, 40.7), b.project(-73.95, 40.7));
    }

    #[test]
    fn invert_round_trips_inside_domain() {
        let projection = fit_size(PanelSize::new(500.0, 500.0), &nyc_box()).unwrap();
        let (x, y) = projection.project(-73.98, 40.75).unwrap();
        let (lon, lat) = projection.invert(x, y);
        assert!((lon - -73.98).abs() < 1e-9);
        assert!((lat - 40.75).abs() < 1e-9);
    }

    #[test]
    fn out_of_domain_positions_are_unprojectable() {
        let projection = fit_size(PanelSize::new(500.0, 500.0), &nyc_box()).unwrap();
        assert!(projection.project(0.0, 90.0).is_none());
        assert!(projection.project(0.0, -90.0).is_none());
        assert!(projection.project(200.0, 10.0).is_none());
        assert!(projection.project(f64::NAN, 10.0).is_none());
    }

    #[test]
    fn projects_one_position_per_record() {
        let projection = fit_size(PanelSize::new(500.0, 500.0), &nyc_box()).unwrap();
        let records = vec![
            IncidentRecord::new("a", Severity::Fatal).with_position(40.7, -74.0),
            IncidentRecord::new("b", Severity::Injury),
            IncidentRecord::new("c", Severity::PropertyDamageOnly).with_position(95.0, -74.0),
        ];

        let projected = project_records(&projection, &records);
        assert_eq!(projected.len(), 3);
        assert!(projected[0].is_projectable());
        assert_eq!(projected[1], ProjectedPosition::Unprojectable);
        assert_eq!(projected[2], ProjectedPosition::Unprojectable);
    }
}
