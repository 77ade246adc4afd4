//! Point cloud raster layer.
//!
//! Every [`RasterLayer::paint`] call clears the whole buffer and repaints
//! every point, then the hover highlight on top. Point membership changes
//! between fit cycles, so nothing is composited incrementally.
//!
//! Base points are painted in severity tiers, least severe first, and in
//! record order within a tier. Overlapping marks therefore always leave the
//! fatal style on top, and the base pass does not depend on hover state.

use crash_map_incident_models::Severity;
use image::{Rgba, RgbaImage};

use crate::style::{Color, RasterStyle};
use crate::{PanelSize, RenderError};

/// One projectable incident to paint, in panel pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPoint {
    pub x: f64,
    pub y: f64,
    pub severity: Severity,
}

impl RasterPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, severity: Severity) -> Self {
        Self { x, y, severity }
    }
}

/// Order in which base points are painted: by severity tier ascending,
/// then by input position.
#[must_use]
pub fn draw_order(points: &[RasterPoint]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    // Stable sort keeps input order within a tier.
    order.sort_by_key(|&i| points[i].severity.paint_tier());
    order
}

/// RGBA pixel buffer holding the painted point cloud.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    image: RgbaImage,
    pixel_ratio: f64,
    marks: usize,
    highlighted: bool,
}

impl Default for RasterLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterLayer {
    /// Creates an empty zero-sized layer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            pixel_ratio: 1.0,
            marks: 0,
            highlighted: false,
        }
    }

    /// Resizes the buffer for the given panel size. The buffer is
    /// reallocated only when its physical dimensions change.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BufferTooLarge`] if the physical buffer would
    /// exceed [`crate::MAX_BUFFER_SIDE`]. The layer is left unchanged.
    pub fn resize(&mut self, size: PanelSize) -> Result<(), RenderError> {
        let (width, height) = size.physical_dimensions()?;
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
        self.pixel_ratio = size.pixel_ratio();
        Ok(())
    }

    /// Clears the buffer and repaints all points plus the optional hover
    /// highlight at `hover` (panel pixels).
    pub fn paint(
        &mut self,
        points: &[RasterPoint],
        hover: Option<(f64, f64)>,
        style: &RasterStyle,
    ) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }

        let ratio = self.pixel_ratio;
        let radius = style.point_radius_px * ratio;

        self.marks = 0;
        for i in draw_order(points) {
            let point = points[i];
            let color = style.severities.for_severity(point.severity);
            if fill_disc(&mut self.image, point.x * ratio, point.y * ratio, radius, color) {
                self.marks += 1;
            }
        }

        self.highlighted = false;
        if let Some((x, y)) = hover
            && x.is_finite()
            && y.is_finite()
        {
            let highlight = &style.highlight;
            let (cx, cy) = (x * ratio, y * ratio);
            let ring = stroke_ring(
                &mut self.image,
                cx,
                cy,
                highlight.ring_radius_px * ratio,
                highlight.ring_width_px * ratio,
                highlight.color,
            );
            let dot = fill_disc(
                &mut self.image,
                cx,
                cy,
                highlight.dot_radius_px * ratio,
                highlight.color,
            );
            self.highlighted = ring || dot;
        }
    }

    /// The painted buffer, in physical pixels.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Number of base point marks the last [`Self::paint`] drew into the
    /// buffer. Points clipped entirely outside it are not counted.
    #[must_use]
    pub const fn marks_painted(&self) -> usize {
        self.marks
    }

    /// Whether the last [`Self::paint`] drew a visible hover highlight.
    #[must_use]
    pub const fn has_highlight(&self) -> bool {
        self.highlighted
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }
}

/// Pixel-space bounding box of a circle, clamped to the image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_span(image: &RgbaImage, cx: f64, cy: f64, reach: f64) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || !reach.is_finite() || reach <= 0.0 {
        return None;
    }

    let x0 = (cx - reach).floor().max(0.0);
    let y0 = (cy - reach).floor().max(0.0);
    let x1 = (cx + reach).ceil().min(f64::from(width - 1));
    let y1 = (cy + reach).ceil().min(f64::from(height - 1));
    if x0 > x1 || y0 > y1 {
        return None;
    }

    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Paints `coverage(distance)` of `color` over every pixel near the center.
/// Returns whether any pixel received coverage.
fn paint_coverage(
    image: &mut RgbaImage,
    cx: f64,
    cy: f64,
    reach: f64,
    color: Color,
    coverage: impl Fn(f64) -> f64,
) -> bool {
    let Some((x0, y0, x1, y1)) = pixel_span(image, cx, cy, reach) else {
        return false;
    };

    let mut painted = false;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = f64::from(px) + 0.5 - cx;
            let dy = f64::from(py) + 0.5 - cy;
            let amount = coverage(dx.hypot(dy)).clamp(0.0, 1.0);
            if amount > 0.0 {
                blend(image.get_pixel_mut(px, py), color, amount);
                painted = true;
            }
        }
    }
    painted
}

/// Anti-aliased filled circle.
fn fill_disc(image: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Color) -> bool {
    paint_coverage(image, cx, cy, radius + 1.0, color, |d| radius + 0.5 - d)
}

/// Anti-aliased circle outline centered on `radius`.
fn stroke_ring(
    image: &mut RgbaImage,
    cx: f64,
    cy: f64,
    radius: f64,
    width: f64,
    color: Color,
) -> bool {
    let half = width / 2.0;
    paint_coverage(image, cx, cy, radius + half + 1.0, color, |d| {
        half + 0.5 - (d - radius).abs()
    })
}

/// Straight-alpha source-over.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
fn blend(pixel: &mut Rgba<u8>, color: Color, coverage: f64) {
    let src_a = f64::from(color.a.clamp(0.0, 1.0)) * coverage;
    if src_a <= 0.0 {
        return;
    }

    let [dr, dg, db, da] = pixel.0;
    let dst_a = f64::from(da) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let mix = |src: u8, dst: u8| {
        let value = (f64::from(src) * src_a + f64::from(dst) * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    pixel.0 = [
        mix(color.r, dr),
        mix(color.g, dg),
        mix(color.b, db),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ];
}
