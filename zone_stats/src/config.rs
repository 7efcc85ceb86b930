// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

use geo_types::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A loose scalar as it comes out of a tabular source (spreadsheet cell,
/// CSV field, remote sheet value), before any typing is applied.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    Text(String),
    Number(f64),
    /// A missing cell. Readers are expected to map blank cells to this
    /// variant so that column probing can skip them.
    Empty,
}

/// One row of a tabular source: a mapping from column name to raw value.
///
/// Column names are kept exactly as the source spells them. The normalizer
/// is in charge of recognizing the accepted spelling variants.
pub type RawRecord = HashMap<String, RawValue>;

/// The zone-matching mode for a whole session. A data set is either keyed
/// by coordinates or by commune name, never both at once.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ZoneMode {
    Geometry,
    Name,
}

/// The zone key carried by a canonical row. Which variant is populated is
/// determined by the session's [ZoneMode].
#[derive(PartialEq, Debug, Clone)]
pub enum ZoneKey {
    Coordinates { lat: f64, lon: f64 },
    Commune(String),
}

/// One validated survey observation, ready for aggregation.
#[derive(PartialEq, Debug, Clone)]
pub struct CanonicalRow {
    /// Source line number (1-based, counting the header row). Diagnostics
    /// only, never used in aggregation.
    pub row_ordinal: usize,
    /// Ranch identifier as spelled in the source. May be empty.
    pub ranch_id: String,
    pub zone_key: ZoneKey,
    pub year: i32,
    pub weaning_pct: Option<f64>,
    pub marking_pct: Option<f64>,
    pub bar_weight: Option<f64>,
    pub lamb_count: Option<f64>,
    pub yearling_count: Option<f64>,
    pub ewe_count: Option<f64>,
    pub ram_count: Option<f64>,
}

/// A region to aggregate over, produced by the map or the CLI at selection
/// time and consumed once.
#[derive(PartialEq, Debug, Clone)]
pub enum ZoneDescriptor {
    Polygon {
        label: String,
        geometry: MultiPolygon<f64>,
    },
    Name {
        label: String,
    },
}

impl ZoneDescriptor {
    pub fn label(&self) -> &str {
        match self {
            ZoneDescriptor::Polygon { label, .. } => label,
            ZoneDescriptor::Name { label } => label,
        }
    }
}

/// The year filter: everything, or one specific year.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum YearSelection {
    All,
    Year(i32),
}

impl Display for YearSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YearSelection::All => write!(f, "ALL"),
            YearSelection::Year(y) => write!(f, "{}", y),
        }
    }
}

impl FromStr for YearSelection {
    type Err = ZoneStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("all") {
            return Ok(YearSelection::All);
        }
        t.parse::<i32>()
            .map(YearSelection::Year)
            .map_err(|_| ZoneStatsError::InvalidYearSelection(s.to_string()))
    }
}

// ******** Output data structures *********

/// Mean metrics for one year of the history breakdown.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct YearMeans {
    pub year: i32,
    #[serde(rename = "weaningPct")]
    pub weaning_pct: Option<f64>,
    #[serde(rename = "markingPct")]
    pub marking_pct: Option<f64>,
    #[serde(rename = "barWeight")]
    pub bar_weight: Option<f64>,
}

/// The outcome of one aggregation pass over a zone.
///
/// Every mean and sum is `None` when no row contributed a value: `None` is
/// the "no data" sentinel throughout, never zero or NaN.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    #[serde(rename = "zoneLabel")]
    pub zone_label: String,
    /// "ALL" or the selected year, as displayed.
    #[serde(rename = "yearSelection")]
    pub year_selection: String,
    #[serde(rename = "recordCount")]
    pub record_count: usize,
    #[serde(rename = "weaningPct")]
    pub weaning_pct: Option<f64>,
    #[serde(rename = "markingPct")]
    pub marking_pct: Option<f64>,
    #[serde(rename = "barWeight")]
    pub bar_weight: Option<f64>,
    #[serde(rename = "lambCount")]
    pub lamb_count: Option<f64>,
    #[serde(rename = "yearlingCount")]
    pub yearling_count: Option<f64>,
    #[serde(rename = "eweCount")]
    pub ewe_count: Option<f64>,
    #[serde(rename = "ramCount")]
    pub ram_count: Option<f64>,
    /// Per-year breakdown of the mean metrics, ascending by year. Present
    /// only when the selection is all years. Sparse: years without rows in
    /// the matched subset do not appear.
    pub history: Option<Vec<YearMeans>>,
    /// Set when a name-mode query matched zero rows, to remind the caller
    /// that name matching is exact and a zero-match query is not
    /// necessarily missing data.
    #[serde(rename = "exactMatchNote")]
    pub exact_match_note: bool,
}

/// Errors that prevent an aggregation request from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ZoneStatsError {
    /// No data set has been loaded into the session yet.
    NoData,
    InvalidYearSelection(String),
}

impl Error for ZoneStatsError {}

impl Display for ZoneStatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneStatsError::NoData => {
                write!(f, "no survey data loaded: load a spreadsheet first")
            }
            ZoneStatsError::InvalidYearSelection(s) => {
                write!(f, "year selection is neither ALL nor a year: {:?}", s)
            }
        }
    }
}
