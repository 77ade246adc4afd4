#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Rendering pipeline for the crash map panel.
//!
//! Two layers share one fitted [`projection::Projection`]:
//!
//! * [`vector::VectorLayer`] draws boundary outlines as SVG paths.
//! * [`raster::RasterLayer`] paints the incident point cloud and the hover
//!   highlight into an RGBA pixel buffer, repainted wholesale on every
//!   update.
//!
//! All geometry is expressed in panel (CSS) pixels. Only the raster buffer
//! is sized in physical pixels, scaled by the device pixel ratio.

pub mod projection;
pub mod raster;
pub mod style;
pub mod vector;

use serde::{Deserialize, Serialize};

/// Largest raster side, in physical pixels, the panel will allocate.
pub const MAX_BUFFER_SIDE: u32 = 16_384;

/// Errors from projection fitting.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FitError {
    /// The panel has not been laid out yet (zero or invalid size).
    #[error("panel not ready: {width}x{height}")]
    NotReady {
        /// Reported panel width.
        width: f64,
        /// Reported panel height.
        height: f64,
    },

    /// The boundary collection has no projectable vertices.
    #[error("boundary geometry has no projectable vertices")]
    EmptyGeometry,

    /// Every projectable vertex maps to the same point.
    #[error("boundary geometry has a zero-area extent")]
    DegenerateExtent,
}

/// Errors from raster buffer management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The requested buffer exceeds [`MAX_BUFFER_SIDE`] on some side.
    #[error("raster buffer {width}x{height} exceeds the {}px limit", MAX_BUFFER_SIDE)]
    BufferTooLarge {
        /// Requested physical width.
        width: u64,
        /// Requested physical height.
        height: u64,
    },
}

/// Current panel dimensions as reported by the host layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSize {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
    /// Physical pixels per CSS pixel.
    pub device_pixel_ratio: f64,
}

impl PanelSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    #[must_use]
    pub const fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Whether both dimensions are positive and finite.
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Device pixel ratio, falling back to 1 for non-positive or
    /// non-finite values.
    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }

    /// Raster buffer dimensions in physical pixels.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BufferTooLarge`] if either side exceeds
    /// [`MAX_BUFFER_SIDE`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn physical_dimensions(&self) -> Result<(u32, u32), RenderError> {
        let ratio = self.pixel_ratio();
        let side = |css: f64| {
            let physical = (css.max(0.0) * ratio).ceil();
            if physical.is_finite() {
                physical as u64
            } else {
                u64::MAX
            }
        };
        let (width, height) = (side(self.width), side(self.height));
        let limit = u64::from(MAX_BUFFER_SIDE);

        if width > limit || height > limit {
            return Err(RenderError::BufferTooLarge { width, height });
        }

        Ok((width as u32, height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_nan_sizes_are_not_laid_out() {
        assert!(!PanelSize::new(0.0, 100.0).is_laid_out());
        assert!(!PanelSize::new(100.0, 0.0).is_laid_out());
        assert!(!PanelSize::new(f64::NAN, 100.0).is_laid_out());
        assert!(PanelSize::new(1.0, 1.0).is_laid_out());
    }

    #[test]
    fn physical_dimensions_scale_by_pixel_ratio() {
        let size = PanelSize::new(100.5, 50.0).with_device_pixel_ratio(2.0);
        assert_eq!(size.physical_dimensions().unwrap(), (201, 100));

        let size = PanelSize::new(10.2, 10.0);
        assert_eq!(size.physical_dimensions().unwrap(), (11, 10));
    }

    #[test]
    fn invalid_pixel_ratio_falls_back_to_one() {
        let size = PanelSize::new(10.0, 10.0).with_device_pixel_ratio(0.0);
        assert!((size.pixel_ratio() - 1.0).abs() < f64::EPSILON);
        assert_eq!(size.physical_dimensions().unwrap(), (10, 10));
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        let size = PanelSize::new(10_000.0, 10.0).with_device_pixel_ratio(2.0);
        assert!(matches!(
            size.physical_dimensions(),
            Err(RenderError::BufferTooLarge { width: 20_000, .. })
        ));
    }
}
