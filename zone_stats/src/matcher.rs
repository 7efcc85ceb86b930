//! Zone membership: geometric containment and normalized-name equality.

use geo::Intersects;
use geo_types::Point;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::*;

/// Canonical form used for name comparisons: trimmed, lower-cased, and
/// stripped of diacritics (canonical decomposition with the combining
/// marks removed). "Última Esperanza" and "ultima esperanza" normalize to
/// the same string. There is no substring or fuzzy matching on top of
/// this: "Natales" and "Puerto Natales" stay distinct.
pub fn normalize_name(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

impl ZoneDescriptor {
    /// Whether the row belongs to this zone. Pure predicate.
    ///
    /// Geometric membership is boundary-inclusive: a point exactly on the
    /// polygon edge counts as inside. Multi-ring (donut) and disjoint
    /// multipolygon geometries are handled by the underlying test.
    ///
    /// A row keyed for the other mode never matches.
    pub fn matches(&self, row: &CanonicalRow) -> bool {
        match (self, &row.zone_key) {
            (ZoneDescriptor::Polygon { geometry, .. }, ZoneKey::Coordinates { lat, lon }) => {
                geometry.intersects(&Point::new(*lon, *lat))
            }
            (ZoneDescriptor::Name { label }, ZoneKey::Commune(name)) => {
                normalize_name(label) == normalize_name(name)
            }
            _ => false,
        }
    }
}
