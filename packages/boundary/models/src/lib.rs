#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Administrative boundary types.
//!
//! Boundaries are loaded once by a geometry source and are read-only to
//! the map panel: they drive projection fitting and the vector outline
//! layer.

use std::collections::BTreeMap;

use geo::{Coord, CoordsIter, MultiPolygon, Polygon};

/// One named polygon or multipolygon in geographic (lon, lat) degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    /// Display name (e.g. a borough name).
    pub name: String,
    /// Scalar feature properties, stringified.
    pub properties: BTreeMap<String, String>,
    /// Polygon geometry. Single polygons are stored as a one-element
    /// multipolygon.
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryFeature {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
            geometry,
        }
    }

    /// Wraps a single polygon.
    #[must_use]
    pub fn from_polygon(name: impl Into<String>, polygon: Polygon<f64>) -> Self {
        Self::new(name, MultiPolygon(vec![polygon]))
    }
}

/// The full set of boundaries shown on the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    features: Vec<BoundaryFeature>,
}

impl BoundaryCollection {
    #[must_use]
    pub const fn new(features: Vec<BoundaryFeature>) -> Self {
        Self { features }
    }

    #[must_use]
    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundaryFeature> {
        self.features.iter()
    }

    /// Iterates every vertex of every ring of every feature.
    pub fn coords(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.features
            .iter()
            .flat_map(|feature| feature.geometry.coords_iter())
    }
}

impl<'a> IntoIterator for &'a BoundaryCollection {
    type Item = &'a BoundaryFeature;
    type IntoIter = std::slice::Iter<'a, BoundaryFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    #[test]
    fn coords_visits_every_ring_vertex() {
        let outer = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let collection = BoundaryCollection::new(vec![
            BoundaryFeature::from_polygon("a", outer.clone()),
            BoundaryFeature::from_polygon("b", outer),
        ]);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.coords().count(), 8);
    }

    #[test]
    fn empty_collection_has_no_coords() {
        let collection = BoundaryCollection::default();
        assert!(collection.is_empty());
        assert_eq!(collection.coords().count(), 0);
    }
}
