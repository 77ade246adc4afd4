//! Boundary `GeoJSON` loader.
//!
//! Accepts a `FeatureCollection` whose features carry `Polygon` or
//! `MultiPolygon` geometries. Features with any other (or no) geometry are
//! skipped with a warning; a collection with no usable polygons is
//! malformed.

use std::collections::BTreeMap;

use crash_map_boundary_models::{BoundaryCollection, BoundaryFeature};
use geo::MultiPolygon;
use geojson::GeoJson;

use crate::SourceError;

/// Property read for the boundary name when none is configured.
pub const DEFAULT_NAME_PROPERTY: &str = "name";

/// Property tried when the configured name property is absent.
const FALLBACK_NAME_PROPERTY: &str = "boro_name";

/// Parses a `GeoJSON` `FeatureCollection` into a [`BoundaryCollection`].
///
/// # Errors
///
/// Returns [`SourceError::GeoJson`] if the text is not valid `GeoJSON` and
/// [`SourceError::Malformed`] if it is not a `FeatureCollection` or holds
/// no polygon features.
pub fn parse_feature_collection(
    text: &str,
    name_property: &str,
) -> Result<BoundaryCollection, SourceError> {
    let geojson: GeoJson = text.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(SourceError::Malformed {
            message: "boundary GeoJSON is not a FeatureCollection".to_string(),
        });
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.into_iter().enumerate() {
        let properties = stringify_properties(feature.properties.as_ref());
        let name = properties
            .get(name_property)
            .or_else(|| properties.get(FALLBACK_NAME_PROPERTY))
            .cloned()
            .unwrap_or_else(|| format!("feature-{i}"));

        let Some(geometry) = feature.geometry else {
            log::warn!("Boundary feature {name} has no geometry; skipping");
            continue;
        };

        let Some(multi_polygon) = to_multipolygon(geometry) else {
            log::warn!("Boundary feature {name} is not a polygon; skipping");
            continue;
        };

        features.push(BoundaryFeature {
            name,
            properties,
            geometry: multi_polygon,
        });
    }

    if features.is_empty() {
        return Err(SourceError::Malformed {
            message: "boundary GeoJSON contains no polygon features".to_string(),
        });
    }

    Ok(BoundaryCollection::new(features))
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Keeps scalar properties as strings; nested values and nulls are dropped.
fn stringify_properties(properties: Option<&geojson::JsonObject>) -> BTreeMap<String, String> {
    properties
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOROUGHS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "boro_name": "Manhattan", "boro_code": 1, "shape_area": null },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.02, 40.70], [-73.93, 40.70], [-73.93, 40.88], [-74.02, 40.70]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Staten Island" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-74.25, 40.50], [-74.05, 40.50], [-74.05, 40.65], [-74.25, 40.50]]],
                        [[[-74.20, 40.64], [-74.19, 40.64], [-74.19, 40.65], [-74.20, 40.64]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Marker" },
                "geometry": { "type": "Point", "coordinates": [-73.9, 40.7] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn keeps_polygon_features_only() {
        let collection = parse_feature_collection(BOROUGHS, DEFAULT_NAME_PROPERTY).unwrap();
        assert_eq!(collection.len(), 2);

        let manhattan = &collection.features()[0];
        assert_eq!(manhattan.name, "Manhattan");
        assert_eq!(manhattan.geometry.0.len(), 1);
        assert_eq!(manhattan.properties.get("boro_code").map(String::as_str), Some("1"));
        assert!(!manhattan.properties.contains_key("shape_area"));

        let staten = &collection.features()[1];
        assert_eq!(staten.name, "Staten Island");
        assert_eq!(staten.geometry.0.len(), 2);
    }

    #[test]
    fn custom_name_property_falls_back_to_index() {
        let collection = parse_feature_collection(BOROUGHS, "boro_code").unwrap();
        assert_eq!(collection.features()[0].name, "1");
        assert_eq!(collection.features()[1].name, "feature-1");
    }

    #[test]
    fn rejects_non_collection() {
        let err = parse_feature_collection(
            r#"{ "type": "Point", "coordinates": [0.0, 0.0] }"#,
            DEFAULT_NAME_PROPERTY,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn rejects_collection_without_polygons() {
        let err = parse_feature_collection(
            r#"{ "type": "FeatureCollection", "features": [] }"#,
            DEFAULT_NAME_PROPERTY,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_feature_collection("{ not json", DEFAULT_NAME_PROPERTY).unwrap_err();
        assert!(matches!(err, SourceError::GeoJson(_)));
    }
}
