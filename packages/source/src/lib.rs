#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geometry sources for the crash map panel.
//!
//! A [`GeometrySource`] supplies the two inputs the panel needs: the
//! boundary collection and the already-typed incident records. The file
//! implementation reads a `GeoJSON` `FeatureCollection` and an incident CSV;
//! the in-memory implementation hands over pre-built data.

pub mod boundaries;
pub mod incidents;
pub mod parsing;

use std::path::{Path, PathBuf};

use crash_map_boundary_models::BoundaryCollection;
use crash_map_incident_models::IncidentRecord;

/// Errors that can occur while loading geometry or records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file read).
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Input parsed but does not have the expected shape.
    #[error("Malformed input: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

/// Supplies boundaries and incident records to the panel.
///
/// Loading happens once, at mount. A failure from either method aborts
/// initialization.
pub trait GeometrySource {
    /// Loads the boundary polygons.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the boundaries are unavailable or cannot
    /// be parsed.
    fn load_boundaries(&self) -> Result<BoundaryCollection, SourceError>;

    /// Loads the incident records.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the records are unavailable or cannot be
    /// parsed. Individual malformed numeric fields are coerced to missing
    /// and never cause an error.
    fn load_incidents(&self) -> Result<Vec<IncidentRecord>, SourceError>;
}

/// Reads boundaries from a `GeoJSON` file and incidents from a CSV file.
#[derive(Debug, Clone)]
pub struct FileSource {
    /// Path to the boundary `FeatureCollection`.
    pub boundaries_path: PathBuf,
    /// Path to the incident CSV.
    pub incidents_path: PathBuf,
    /// Feature property used as the boundary name.
    pub name_property: String,
}

impl FileSource {
    #[must_use]
    pub fn new(boundaries_path: impl Into<PathBuf>, incidents_path: impl Into<PathBuf>) -> Self {
        Self {
            boundaries_path: boundaries_path.into(),
            incidents_path: incidents_path.into(),
            name_property: boundaries::DEFAULT_NAME_PROPERTY.to_string(),
        }
    }

    #[must_use]
    pub fn with_name_property(mut self, property: impl Into<String>) -> Self {
        self.name_property = property.into();
        self
    }
}

fn read_file(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl GeometrySource for FileSource {
    fn load_boundaries(&self) -> Result<BoundaryCollection, SourceError> {
        let text = read_file(&self.boundaries_path)?;
        let collection = boundaries::parse_feature_collection(&text, &self.name_property)?;
        log::info!(
            "Loaded {} boundary features from {}",
            collection.len(),
            self.boundaries_path.display()
        );
        Ok(collection)
    }

    fn load_incidents(&self) -> Result<Vec<IncidentRecord>, SourceError> {
        let file = std::fs::File::open(&self.incidents_path).map_err(|source| SourceError::Io {
            path: self.incidents_path.clone(),
            source,
        })?;
        let records = incidents::read_incidents(file)?;
        log::info!(
            "Loaded {} incident records from {}",
            records.len(),
            self.incidents_path.display()
        );
        Ok(records)
    }
}

/// Hands over data that was already loaded elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub boundaries: BoundaryCollection,
    pub incidents: Vec<IncidentRecord>,
}

impl MemorySource {
    #[must_use]
    pub const fn new(boundaries: BoundaryCollection, incidents: Vec<IncidentRecord>) -> Self {
        Self {
            boundaries,
            incidents,
        }
    }
}

impl GeometrySource for MemorySource {
    fn load_boundaries(&self) -> Result<BoundaryCollection, SourceError> {
        Ok(self.boundaries.clone())
    }

    fn load_incidents(&self) -> Result<Vec<IncidentRecord>, SourceError> {
        Ok(self.incidents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let source = FileSource::new("/nonexistent/boroughs.geojson", "/nonexistent/crashes.csv");
        let err = source.load_boundaries().unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("boroughs.geojson"));

        let err = source.load_incidents().unwrap_err();
        assert!(err.to_string().contains("crashes.csv"));
    }

    #[test]
    fn memory_source_returns_its_data() {
        let source = MemorySource::new(
            BoundaryCollection::default(),
            vec![IncidentRecord::new("1", Default::default())],
        );
        assert!(source.load_boundaries().unwrap().is_empty());
        assert_eq!(source.load_incidents().unwrap().len(), 1);
    }
}
