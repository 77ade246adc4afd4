//! Boundary outline layer.
//!
//! Renders one SVG path per boundary feature plus a transparent hit
//! rectangle covering the panel. [`VectorLayer::render`] replaces the
//! previous output entirely, so repeated renders never leave stale paths.

use std::fmt;

use crash_map_boundary_models::BoundaryCollection;
use geo::{LineString, MultiPolygon};

use crate::PanelSize;
use crate::projection::Projection;
use crate::style::OutlineStyle;

/// One rendered boundary outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPath {
    /// Feature name, used as the path's `data-name`.
    pub name: String,
    /// SVG path data in panel pixels. Empty if no vertex was projectable.
    pub d: String,
}

/// SVG vector layer holding the current boundary paths.
#[derive(Debug, Clone, Default)]
pub struct VectorLayer {
    width: f64,
    height: f64,
    outline: OutlineStyle,
    paths: Vec<BoundaryPath>,
}

impl VectorLayer {
    #[must_use]
    pub fn new(outline: OutlineStyle) -> Self {
        Self {
            outline,
            ..Self::default()
        }
    }

    /// Replaces all paths with freshly projected outlines.
    pub fn render(
        &mut self,
        projection: &Projection,
        boundaries: &BoundaryCollection,
        size: PanelSize,
    ) {
        self.width = size.width;
        self.height = size.height;
        self.paths = boundaries
            .iter()
            .map(|feature| BoundaryPath {
                name: feature.name.clone(),
                d: path_data(projection, &feature.geometry),
            })
            .collect();

        log::debug!("Rendered {} boundary paths", self.paths.len());
    }

    #[must_use]
    pub fn paths(&self) -> &[BoundaryPath] {
        &self.paths
    }

    /// Serialises the layer as a standalone SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VectorLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = format_coord(self.width);
        let height = format_coord(self.height);

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="map-svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;

        let stroke = self.outline.stroke.to_css();
        let stroke_width = format_coord(self.outline.stroke_width_px);
        for path in &self.paths {
            writeln!(
                f,
                r#"  <path class="boundary-outline" data-name="{}" fill="none" stroke="{stroke}" stroke-width="{stroke_width}" d="{}"/>"#,
                escape_attribute(&path.name),
                path.d
            )?;
        }

        writeln!(
            f,
            r#"  <rect class="map-hit-rect" width="{width}" height="{height}" fill="transparent"/>"#
        )?;
        write!(f, "</svg>")
    }
}

/// SVG path data for every ring of a multipolygon.
///
/// Unprojectable vertices are skipped; rings left with fewer than three
/// vertices are dropped.
#[must_use]
pub fn path_data(projection: &Projection, geometry: &MultiPolygon<f64>) -> String {
    geometry
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .filter_map(|ring| ring_data(projection, ring))
        .collect()
}

fn ring_data(projection: &Projection, ring: &LineString<f64>) -> Option<String> {
    let points: Vec<(f64, f64)> = ring
        .coords()
        .filter_map(|c| projection.project(c.x, c.y))
        .collect();

    if points.len() < 3 {
        return None;
    }

    let mut d: String = points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| {
            let command = if i == 0 { 'M' } else { 'L' };
            format!("{command}{},{}", format_coord(*x), format_coord(*y))
        })
        .collect();
    d.push('Z');
    Some(d)
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
fn format_coord(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
