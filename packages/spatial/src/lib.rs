#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for hover lookups.
//!
//! Indexes projected incident positions (panel pixels) in an R-tree and
//! answers "nearest point within `radius` of the pointer" queries. The
//! index is immutable once built; every fit cycle builds a fresh one and
//! replaces the old one wholesale.

use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree};

/// A projected point paired with the index of its source record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    /// Position of the source record in the panel's record list.
    pub record: usize,
    /// Panel x coordinate.
    pub x: f64,
    /// Panel y coordinate.
    pub y: f64,
}

impl IndexEntry {
    #[must_use]
    pub const fn new(record: usize, x: f64, y: f64) -> Self {
        Self { record, x, y }
    }
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// R-tree over projected incident positions.
///
/// Nearest-neighbour ties are broken by the lowest record index, so the
/// first-inserted record wins regardless of tree layout.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.tree.size())
            .finish()
    }
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from the given entries.
    #[must_use]
    pub fn from_entries<I: IntoIterator<Item = IndexEntry>>(entries: I) -> Self {
        let mut index = Self::new();
        index.build(entries);
        index
    }

    /// Replaces the index contents with exactly the given entries.
    ///
    /// Entries with non-finite coordinates are dropped; callers are expected
    /// to pass only projectable positions.
    pub fn build<I: IntoIterator<Item = IndexEntry>>(&mut self, entries: I) {
        let points: Vec<IndexedPoint> = entries
            .into_iter()
            .filter(|e| e.x.is_finite() && e.y.is_finite())
            .map(|e| GeomWithData::new([e.x, e.y], e.record))
            .collect();

        self.tree = RTree::bulk_load(points);
        log::debug!("Built spatial index with {} entries", self.tree.size());
    }

    /// Returns the entry nearest to `(x, y)` whose distance is strictly less
    /// than `radius`, or `None` if no entry is that close.
    ///
    /// Equidistant candidates resolve to the lowest record index.
    #[must_use]
    pub fn query(&self, x: f64, y: f64, radius: f64) -> Option<IndexEntry> {
        if !(x.is_finite() && y.is_finite() && radius.is_finite() && radius > 0.0) {
            return None;
        }

        let query = [x, y];
        let max_distance_2 = radius * radius;

        self.tree
            .locate_within_distance(query, max_distance_2)
            .map(|point| (point.distance_2(&query), point))
            .filter(|(distance_2, _)| *distance_2 < max_distance_2)
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.data.cmp(&b.data)))
            .map(|(_, point)| {
                let [px, py] = *point.geom();
                IndexEntry::new(point.data, px, py)
            })
    }

    /// Number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Whether the given record index is present.
    ///
    /// Linear scan over every entry.
    #[must_use]
    pub fn contains(&self, record: usize) -> bool {
        self.tree.iter().any(|point| point.data == record)
    }

    /// Iterates all entries in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        self.tree.iter().map(|point| {
            let [x, y] = *point.geom();
            IndexEntry::new(point.data, x, y)
        })
    }
}
