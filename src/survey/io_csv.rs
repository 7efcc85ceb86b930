// Primitives for reading CSV survey files.

use log::debug;
use snafu::prelude::*;

use zone_stats::RawRecord;

use crate::survey::{io_common::field_to_raw, *};

/// Reads a CSV file with a header row into raw records.
pub fn read_csv_records(path: &str) -> SurveyResult<Vec<RawRecord>> {
    let mut rdr = csv::Reader::from_path(path).context(CsvOpenSnafu { path })?;
    let headers = rdr
        .headers()
        .context(CsvLineParseSnafu {})?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<String>>();
    debug!("read_csv_records: header: {:?}", headers);

    let mut res: Vec<RawRecord> = Vec::new();
    for line_r in rdr.records() {
        let line = line_r.context(CsvLineParseSnafu {})?;
        let mut record = RawRecord::new();
        for (name, field) in headers.iter().zip(line.iter()) {
            if !name.is_empty() {
                record.insert(name.clone(), field_to_raw(field));
            }
        }
        res.push(record);
    }
    debug!("read_csv_records: {} records", res.len());
    Ok(res)
}
