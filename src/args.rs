use clap::Parser;

/// Zonal benchmarking for livestock ranch surveys.
///
/// Loads a spreadsheet of survey rows, selects a zone (a commune polygon
/// from a GeoJSON file, or a commune name), and prints aggregate
/// statistics for the rows that fall inside the zone.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey data to load. The format is inferred from
    /// --input-type.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default xlsx) The type of the input: xlsx, csv or sheet-store.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (sheet name) With --input-type sheet-store, the name of the sheet
    /// to fetch from the store file.
    #[clap(long, value_parser)]
    pub sheet: Option<String>,

    /// (default first sheet) When using an Excel file, the name of the
    /// worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path) A GeoJSON FeatureCollection of zone polygons. Rows are
    /// matched geometrically by their coordinates. Mutually exclusive
    /// with --zone-name.
    #[clap(long, value_parser)]
    pub zones: Option<String>,

    /// The label of the zone to select from the --zones file.
    #[clap(short, long, value_parser)]
    pub zone: Option<String>,

    /// A zone name to match rows against by normalized-name equality
    /// (rows must carry a commune column). Mutually exclusive with
    /// --zones.
    #[clap(long, value_parser)]
    pub zone_name: Option<String>,

    /// (default ALL) The year to filter on, or the literal ALL for the
    /// full history breakdown.
    #[clap(short, long, value_parser)]
    pub year: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the benchmark summary
    /// is written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, an HTML report is written to
    /// the given location.
    #[clap(long, value_parser)]
    pub html: Option<String>,

    /// (file path) A reference summary in JSON format. If provided,
    /// zonebench checks that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the
    /// standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
