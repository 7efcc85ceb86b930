// A simple named-sheet store: the remote spreadsheet backend contract.
//
// The store exposes two logical operations: fetching a named sheet as
// ordered records, and replacing a named sheet wholesale. A replace is a
// full clear-and-rewrite; there are no partial updates.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use zone_stats::{RawRecord, RawValue};

use crate::survey::*;

pub trait SheetStore {
    /// Reads a named sheet as ordered records (column name to value).
    fn fetch_sheet(&self, name: &str) -> SurveyResult<Vec<RawRecord>>;

    /// Replaces a named sheet with the given header and rows. The
    /// previous content of the sheet is discarded entirely.
    fn replace_sheet(
        &mut self,
        name: &str,
        header: &[String],
        rows: &[Vec<RawValue>],
    ) -> SurveyResult<()>;
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct SheetDoc {
    header: Vec<String>,
    rows: Vec<Vec<JSValue>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct StoreDoc {
    sheets: BTreeMap<String, SheetDoc>,
}

fn json_to_raw(v: &JSValue) -> RawValue {
    match v {
        JSValue::Null => RawValue::Empty,
        JSValue::Number(n) => match n.as_f64() {
            Some(x) => RawValue::Number(x),
            None => RawValue::Empty,
        },
        JSValue::String(s) if s.trim().is_empty() => RawValue::Empty,
        JSValue::String(s) => RawValue::Text(s.clone()),
        JSValue::Bool(b) => RawValue::Text(b.to_string()),
        // Nested values have no tabular meaning.
        _ => RawValue::Empty,
    }
}

fn raw_to_json(v: &RawValue) -> JSValue {
    match v {
        RawValue::Empty => JSValue::Null,
        RawValue::Text(s) => JSValue::String(s.clone()),
        RawValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(JSValue::Number)
            .unwrap_or(JSValue::Null),
    }
}

fn sheet_to_records(sheet: &SheetDoc) -> Vec<RawRecord> {
    sheet
        .rows
        .iter()
        .map(|row| {
            sheet
                .header
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.clone(), json_to_raw(value)))
                .collect()
        })
        .collect()
}

/// A sheet store backed by a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: &str) -> JsonFileStore {
        JsonFileStore {
            path: PathBuf::from(path),
        }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> SurveyResult<StoreDoc> {
        let path = self.path_str();
        let contents = fs::read_to_string(&self.path).context(OpeningFileSnafu { path: &path })?;
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
    }

    // A missing file is an empty store when writing.
    fn load_or_default(&self) -> SurveyResult<StoreDoc> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).context(ParsingJsonSnafu {
                    path: self.path_str(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreDoc::default()),
            Err(e) => Err(e).context(OpeningFileSnafu {
                path: self.path_str(),
            }),
        }
    }
}

impl SheetStore for JsonFileStore {
    fn fetch_sheet(&self, name: &str) -> SurveyResult<Vec<RawRecord>> {
        let doc = self.load()?;
        let sheet = doc.sheets.get(name).context(SheetNotFoundSnafu { name })?;
        debug!(
            "fetch_sheet: {:?} has {} rows, header {:?}",
            name,
            sheet.rows.len(),
            sheet.header
        );
        Ok(sheet_to_records(sheet))
    }

    fn replace_sheet(
        &mut self,
        name: &str,
        header: &[String],
        rows: &[Vec<RawValue>],
    ) -> SurveyResult<()> {
        let mut doc = self.load_or_default()?;
        doc.sheets.insert(
            name.to_string(),
            SheetDoc {
                header: header.to_vec(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(raw_to_json).collect())
                    .collect(),
            },
        );
        let contents =
            serde_json::to_string_pretty(&doc).context(SerializingSummarySnafu {})?;
        let path = self.path_str();
        fs::write(&self.path, contents).context(WritingFileSnafu { path })?;
        info!("replace_sheet: rewrote sheet {:?} ({} rows)", name, rows.len());
        Ok(())
    }
}

/// An in-memory sheet store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sheets: BTreeMap<String, SheetDoc>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl SheetStore for MemoryStore {
    fn fetch_sheet(&self, name: &str) -> SurveyResult<Vec<RawRecord>> {
        let sheet = self
            .sheets
            .get(name)
            .context(SheetNotFoundSnafu { name })?;
        Ok(sheet_to_records(sheet))
    }

    fn replace_sheet(
        &mut self,
        name: &str,
        header: &[String],
        rows: &[Vec<RawValue>],
    ) -> SurveyResult<()> {
        self.sheets.insert(
            name.to_string(),
            SheetDoc {
                header: header.to_vec(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(raw_to_json).collect())
                    .collect(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        ["comuna", "anio", "pct_destete"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn replace_then_fetch_round_trips() {
        let mut store = MemoryStore::new();
        store
            .replace_sheet(
                "encuesta",
                &header(),
                &[
                    vec![
                        RawValue::Text("Punta Arenas".to_string()),
                        RawValue::Number(2021.0),
                        RawValue::Number(80.0),
                    ],
                    vec![
                        RawValue::Text("Porvenir".to_string()),
                        RawValue::Number(2022.0),
                        RawValue::Empty,
                    ],
                ],
            )
            .unwrap();

        let records = store.fetch_sheet("encuesta").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("comuna"),
            Some(&RawValue::Text("Punta Arenas".to_string()))
        );
        assert_eq!(records[0].get("anio"), Some(&RawValue::Number(2021.0)));
        assert_eq!(records[1].get("pct_destete"), Some(&RawValue::Empty));
    }

    #[test]
    fn replace_discards_previous_content() {
        let mut store = MemoryStore::new();
        store
            .replace_sheet(
                "encuesta",
                &header(),
                &[vec![
                    RawValue::Text("Punta Arenas".to_string()),
                    RawValue::Number(2021.0),
                    RawValue::Number(80.0),
                ]],
            )
            .unwrap();
        store.replace_sheet("encuesta", &header(), &[]).unwrap();
        assert_eq!(store.fetch_sheet("encuesta").unwrap().len(), 0);
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.fetch_sheet("nope"),
            Err(SurveyError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn file_store_round_trips() {
        let mut path = std::env::temp_dir();
        path.push("zonebench_store_test.json");
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::new(path.to_str().unwrap());
        store
            .replace_sheet(
                "encuesta",
                &header(),
                &[vec![
                    RawValue::Text("Río Verde".to_string()),
                    RawValue::Number(2020.0),
                    RawValue::Empty,
                ]],
            )
            .unwrap();

        let records = store.fetch_sheet("encuesta").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("comuna"),
            Some(&RawValue::Text("Río Verde".to_string()))
        );
        assert_eq!(records[0].get("pct_destete"), Some(&RawValue::Empty));
        std::fs::remove_file(&path).unwrap();
    }
}
