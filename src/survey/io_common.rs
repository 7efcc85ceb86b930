use zone_stats::RawValue;

/// Maps a calamine cell to a loose raw value. Blank strings count as
/// missing so that column probing can skip them.
pub fn cell_to_raw(cell: &calamine::DataType) -> RawValue {
    match cell {
        calamine::DataType::String(s) if s.trim().is_empty() => RawValue::Empty,
        calamine::DataType::String(s) => RawValue::Text(s.clone()),
        calamine::DataType::Float(f) => RawValue::Number(*f),
        calamine::DataType::Int(i) => RawValue::Number(*i as f64),
        // Date cells carry the spreadsheet serial number; the normalizer's
        // permissive numeric coercion takes it from there.
        calamine::DataType::DateTime(f) => RawValue::Number(*f),
        calamine::DataType::Bool(b) => RawValue::Text(b.to_string()),
        calamine::DataType::Error(_) => RawValue::Empty,
        calamine::DataType::Empty => RawValue::Empty,
    }
}

/// Maps a CSV field to a loose raw value. All CSV content is text; the
/// numeric coercion happens later in the normalizer.
pub fn field_to_raw(field: &str) -> RawValue {
    if field.trim().is_empty() {
        RawValue::Empty
    } else {
        RawValue::Text(field.to_string())
    }
}
