// Loading zone boundaries from a GeoJSON FeatureCollection.

use std::fs;

use geo_types::{Geometry, MultiPolygon};
use geojson::GeoJson;
use log::{debug, warn};
use snafu::prelude::*;

use zone_stats::normalize_name;

use crate::survey::*;

/// One zone from the boundaries file: a display name and its geometry.
#[derive(Debug, Clone)]
pub struct ZoneFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

// The property spellings under which boundary files carry the commune
// name, probed in order.
const NAME_KEYS: &[&str] = &["Comuna", "COMUNA", "NOM_COMUNA", "nombre", "Name"];

const DEFAULT_ZONE_NAME: &str = "Comuna";

fn feature_name(feature: &geojson::Feature) -> String {
    if let Some(properties) = &feature.properties {
        for key in NAME_KEYS {
            if let Some(serde_json::Value::String(s)) = properties.get(*key) {
                if !s.trim().is_empty() {
                    return s.clone();
                }
            }
        }
    }
    DEFAULT_ZONE_NAME.to_string()
}

pub fn read_zones(path: &str) -> SurveyResult<Vec<ZoneFeature>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    parse_zones(&contents, path)
}

/// Parses a FeatureCollection into zone features. Features without a
/// (multi)polygon geometry are skipped with a warning.
pub fn parse_zones(contents: &str, path: &str) -> SurveyResult<Vec<ZoneFeature>> {
    let gj: GeoJson = contents.parse().context(ParsingGeoJsonSnafu { path })?;
    let fc = match gj {
        GeoJson::FeatureCollection(fc) => fc,
        _ => whatever!("{:?} is not a GeoJSON FeatureCollection", path),
    };

    let mut res: Vec<ZoneFeature> = Vec::new();
    for feature in fc.features {
        let name = feature_name(&feature);
        let geometry = match feature.geometry {
            Some(g) => g,
            None => {
                warn!("parse_zones: feature {:?} has no geometry, skipping", name);
                continue;
            }
        };
        let geometry: Geometry<f64> =
            Geometry::try_from(geometry.value).context(ParsingGeoJsonSnafu { path })?;
        let multi = match geometry {
            Geometry::Polygon(p) => MultiPolygon(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            other => {
                warn!(
                    "parse_zones: feature {:?} is not a polygon ({:?}), skipping",
                    name, other
                );
                continue;
            }
        };
        debug!("parse_zones: zone {:?}", name);
        res.push(ZoneFeature {
            name,
            geometry: multi,
        });
    }
    Ok(res)
}

/// Finds a zone by label, comparing with the same normalization the name
/// matcher uses.
pub fn find_zone<'a>(zones: &'a [ZoneFeature], label: &str) -> Option<&'a ZoneFeature> {
    let target = normalize_name(label);
    zones.iter().find(|z| normalize_name(&z.name) == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NOM_COMUNA": "Río Verde" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0],
                                     [0.0, 1.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0],
                                      [2.0, 3.0], [2.0, 2.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "Name": "line" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[0.0, 0.0], [1.0, 1.0]]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_probes_names() {
        let zones = parse_zones(COLLECTION, "test").unwrap();
        // The line feature is skipped.
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name, "Río Verde");
        assert_eq!(zones[0].geometry.0.len(), 1);
        // No recognized name property: the fixed fallback applies.
        assert_eq!(zones[1].name, "Comuna");
    }

    #[test]
    fn zone_lookup_is_normalized() {
        let zones = parse_zones(COLLECTION, "test").unwrap();
        assert!(find_zone(&zones, "rio verde").is_some());
        assert!(find_zone(&zones, "Río Verde ").is_some());
        assert!(find_zone(&zones, "Verde").is_none());
    }

    #[test]
    fn non_collection_is_an_error() {
        let res = parse_zones(r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#, "test");
        assert!(res.is_err());
    }
}
