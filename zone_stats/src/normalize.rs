//! Row normalization: turns loose tabular records into canonical rows.

use log::debug;

use crate::config::*;

// Accepted source spellings for each canonical field, in probing order.
// Spreadsheets in the field come with inconsistent casing and a mix of
// Spanish and English headers, so the lists are deliberately permissive.
// Extending the normalizer to a new dialect means extending these tables.
const LAT_KEYS: &[&str] = &["lat", "Lat", "LAT", "latitud", "Latitud", "LATITUD"];
const LON_KEYS: &[&str] = &[
    "lon", "Lon", "LON", "long", "Long", "LONG", "longitud", "Longitud", "LONGITUD",
];
const YEAR_KEYS: &[&str] = &["anio", "Año", "AÑO", "ANO", "ano", "year", "Year", "YEAR"];
const COMMUNE_KEYS: &[&str] = &["comuna", "Comuna", "COMUNA", "commune", "Commune"];
const RANCH_ID_KEYS: &[&str] = &["id_estancia", "ID", "id", "estancia", "Estancia"];
const WEANING_KEYS: &[&str] = &["pct_destete", "Pct_destete", "PCT_DESTETE", "destete"];
const MARKING_KEYS: &[&str] = &["pct_senalada", "pct_señalada", "PCT_SENALADA", "senalada"];
const BAR_WEIGHT_KEYS: &[&str] = &["peso_vara", "Peso_vara", "PESO_VARA"];
const LAMB_KEYS: &[&str] = &["n_corderos", "N_corderos", "N_CORDEROS", "corderos"];
const YEARLING_KEYS: &[&str] = &["n_borregos", "N_borregos", "N_BORREGOS", "borregos"];
const EWE_KEYS: &[&str] = &["n_ovejas", "N_ovejas", "N_OVEJAS", "ovejas"];
const RAM_KEYS: &[&str] = &["n_carneros", "N_carneros", "N_CARNEROS", "carneros"];

/// Probes the accepted spellings in order and returns the first value that
/// is actually present (missing cells are skipped).
fn lookup<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a RawValue> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !matches!(v, RawValue::Empty))
}

/// Permissive numeric coercion. Missing and blank map to `None`; anything
/// else goes through a numeric parse and non-finite results map to `None`.
/// Finite values are kept verbatim, no rounding at this stage.
pub fn num_or_null(value: Option<&RawValue>) -> Option<f64> {
    match value {
        None | Some(RawValue::Empty) => None,
        Some(RawValue::Number(n)) if n.is_finite() => Some(*n),
        Some(RawValue::Number(_)) => None,
        Some(RawValue::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            match t.parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => None,
            }
        }
    }
}

fn text_or_empty(value: Option<&RawValue>) -> String {
    match value {
        None | Some(RawValue::Empty) => String::new(),
        Some(RawValue::Text(s)) => s.clone(),
        // Numeric ranch identifiers show up in the wild.
        Some(RawValue::Number(n)) => format!("{}", n),
    }
}

fn numeric_field(record: &RawRecord, keys: &[&str]) -> Option<f64> {
    num_or_null(lookup(record, keys))
}

/// Builds the zone key for one record, or `None` when the mandatory fields
/// cannot be coerced (the row is then dropped).
fn zone_key(record: &RawRecord, mode: ZoneMode) -> Option<ZoneKey> {
    match mode {
        ZoneMode::Geometry => {
            let lat = numeric_field(record, LAT_KEYS)?;
            let lon = numeric_field(record, LON_KEYS)?;
            Some(ZoneKey::Coordinates { lat, lon })
        }
        ZoneMode::Name => {
            let name = text_or_empty(lookup(record, COMMUNE_KEYS));
            if name.trim().is_empty() {
                None
            } else {
                Some(ZoneKey::Commune(name))
            }
        }
    }
}

fn normalize_record(record: &RawRecord, index: usize, mode: ZoneMode) -> Option<CanonicalRow> {
    let zone_key = zone_key(record, mode)?;
    // The year must coerce to a finite number; it is truncated to an
    // integer year.
    let year = numeric_field(record, YEAR_KEYS)? as i32;

    Some(CanonicalRow {
        // 1-based source numbering, counting the header row.
        row_ordinal: index + 2,
        ranch_id: text_or_empty(lookup(record, RANCH_ID_KEYS)),
        zone_key,
        year,
        weaning_pct: numeric_field(record, WEANING_KEYS),
        marking_pct: numeric_field(record, MARKING_KEYS),
        bar_weight: numeric_field(record, BAR_WEIGHT_KEYS),
        lamb_count: numeric_field(record, LAMB_KEYS),
        yearling_count: numeric_field(record, YEARLING_KEYS),
        ewe_count: numeric_field(record, EWE_KEYS),
        ram_count: numeric_field(record, RAM_KEYS),
    })
}

/// Normalizes a batch of records, in order. Rows whose zone key or year
/// cannot be coerced are dropped; all the other rows are kept, duplicates
/// included. Metric columns may individually be missing without
/// invalidating a row.
pub fn normalize_records(records: &[RawRecord], mode: ZoneMode) -> Vec<CanonicalRow> {
    let mut res: Vec<CanonicalRow> = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match normalize_record(record, idx, mode) {
            Some(row) => res.push(row),
            None => {
                debug!(
                    "normalize_records: dropping row {} (missing zone key or year): {:?}",
                    idx + 2,
                    record
                );
            }
        }
    }
    res
}
