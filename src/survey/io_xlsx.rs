// Primitives for reading Excel survey files.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use zone_stats::RawRecord;

use crate::survey::{io_common::cell_to_raw, *};

/// Reads a worksheet into raw records: the first row is the header, every
/// later row becomes one column-name to value mapping.
pub fn read_xlsx_records(
    path: &str,
    worksheet_name: Option<&str>,
) -> SurveyResult<Vec<RawRecord>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu { path })?;
    debug!("read_xlsx_records: header: {:?}", header);

    let columns: Vec<Option<String>> = header
        .iter()
        .map(|cell| match cell {
            calamine::DataType::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect();

    let mut res: Vec<RawRecord> = Vec::new();
    for row in rows {
        let mut record = RawRecord::new();
        for (column, cell) in columns.iter().zip(row.iter()) {
            if let Some(name) = column {
                record.insert(name.clone(), cell_to_raw(cell));
            }
        }
        res.push(record);
    }
    debug!("read_xlsx_records: {} records", res.len());
    Ok(res)
}

fn get_range(
    path: &str,
    worksheet_name: Option<&str>,
) -> SurveyResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(name, wrange)] => {
                debug!("get_range: single worksheet {:?}", name);
                Ok(wrange.clone())
            }
            _ => {
                whatever!(
                    "The workbook {:?} has several worksheets, provide one with --excel-worksheet-name",
                    path
                )
            }
        }
    }
}
