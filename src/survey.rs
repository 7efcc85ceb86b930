use log::{debug, info};

use zone_stats::*;

use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_common;
pub mod io_csv;
pub mod io_geojson;
pub mod io_xlsx;
pub mod render;
pub mod store;

use self::store::SheetStore;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error reading {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error parsing GeoJSON in {path}"))]
    ParsingGeoJson {
        source: geojson::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("No zone labeled {label:?} in the zones file"))]
    ZoneNotFound { label: String },
    #[snafu(display("No sheet named {name:?} in the store"))]
    SheetNotFound { name: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// Reads the survey records from the source selected by the arguments.
fn read_records(args: &Args) -> SurveyResult<Vec<RawRecord>> {
    let input_type = args.input_type.as_deref().unwrap_or("xlsx");
    info!(
        "read_records: reading {:?} as {:?}",
        args.input, input_type
    );
    match input_type {
        "xlsx" => io_xlsx::read_xlsx_records(&args.input, args.excel_worksheet_name.as_deref()),
        "csv" => io_csv::read_csv_records(&args.input),
        "sheet-store" => {
            let sheet = match &args.sheet {
                Some(s) => s,
                None => whatever!("--sheet is required with --input-type sheet-store"),
            };
            let sheet_store = store::JsonFileStore::new(&args.input);
            sheet_store.fetch_sheet(sheet)
        }
        x => whatever!("Input type not implemented: {:?}", x),
    }
}

/// Resolves the zone selection: a polygon looked up in the zones file, or
/// a plain name to match communes against.
fn resolve_zone(args: &Args) -> SurveyResult<(ZoneMode, ZoneDescriptor)> {
    match (&args.zones, &args.zone, &args.zone_name) {
        (Some(_), _, Some(_)) => {
            whatever!("--zones and --zone-name are mutually exclusive")
        }
        (Some(zones_path), Some(label), None) => {
            let zones = io_geojson::read_zones(zones_path)?;
            info!("resolve_zone: {} zones loaded", zones.len());
            let feature = io_geojson::find_zone(&zones, label)
                .context(ZoneNotFoundSnafu { label })?;
            Ok((
                ZoneMode::Geometry,
                ZoneDescriptor::Polygon {
                    label: feature.name.clone(),
                    geometry: feature.geometry.clone(),
                },
            ))
        }
        (Some(_), None, None) => {
            whatever!("--zone is required with --zones")
        }
        (None, _, Some(label)) => Ok((
            ZoneMode::Name,
            ZoneDescriptor::Name {
                label: label.clone(),
            },
        )),
        (None, _, None) => {
            whatever!("Select a zone with --zones/--zone or with --zone-name")
        }
    }
}

fn summary_pretty_json(result: &AggregateResult) -> SurveyResult<String> {
    serde_json::to_string_pretty(result).context(SerializingSummarySnafu {})
}

fn read_reference(path: &str) -> SurveyResult<String> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("read_reference: {:?}", js);
    serde_json::to_string_pretty(&js).context(SerializingSummarySnafu {})
}

pub fn run_benchmark(args: &Args) -> SurveyResult<()> {
    let (mode, zone) = resolve_zone(args)?;

    let selection: YearSelection = match args.year.as_deref().unwrap_or("ALL").parse() {
        Ok(s) => s,
        Err(e) => whatever!("{}", e),
    };

    let mut session = Session::new(mode);
    let seq = session.begin_load();
    let records = match read_records(args) {
        Ok(r) => r,
        Err(e) => {
            // The previous row set (empty here) stays intact on a failed
            // load; the error is surfaced to the caller.
            session.fail_load(seq);
            return Err(e);
        }
    };
    let total = records.len();
    let rows = normalize_records(&records, mode);
    session.complete_load(seq, rows);

    let years: Vec<String> = session.years().iter().map(|y| y.to_string()).collect();
    println!(
        "Loaded {} rows ({} source records). Years: {}",
        session.row_count(),
        total,
        years.join(", ")
    );

    let result = match session.aggregate(&zone, selection) {
        Ok(r) => r,
        // NoData can only happen here if the source had zero usable rows.
        Err(e) => whatever!("{}", e),
    };

    println!("{}", render::render_text(&result));

    let pretty_summary = summary_pretty_json(&result)?;
    match args.out.as_deref() {
        None => {}
        Some("stdout") => println!("{}", pretty_summary),
        Some(path) => {
            fs::write(path, &pretty_summary).context(WritingFileSnafu { path })?;
            info!("run_benchmark: summary written to {:?}", path);
        }
    }

    if let Some(path) = args.html.as_deref() {
        fs::write(path, render::render_html(&result)).context(WritingFileSnafu { path })?;
        info!("run_benchmark: HTML report written to {:?}", path);
    }

    // The reference summary, if provided for comparison.
    if let Some(reference_path) = args.reference.as_deref() {
        let pretty_reference = read_reference(reference_path)?;
        if pretty_reference != pretty_summary {
            print_diff(pretty_reference.as_str(), pretty_summary.as_str(), "\n");
            whatever!("Difference detected between the computed summary and the reference")
        }
        println!("Summary matches the reference.");
    }

    Ok(())
}
