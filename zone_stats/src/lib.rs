mod config;
pub mod format;
mod matcher;
mod normalize;
mod session;

use std::collections::BTreeMap;

use log::{debug, info};

pub use crate::config::*;
pub use crate::matcher::normalize_name;
pub use crate::normalize::{normalize_records, num_or_null};
pub use crate::session::{LoadSeq, Session};

/// Arithmetic mean of a metric over a row subset. Rows without a value for
/// the metric do not contribute; if no row contributes, the result is
/// `None`, never zero or NaN.
pub fn mean<F>(rows: &[&CanonicalRow], field: F) -> Option<f64>
where
    F: Fn(&CanonicalRow) -> Option<f64>,
{
    let vals: Vec<f64> = rows
        .iter()
        .filter_map(|r| field(r))
        .filter(|v| v.is_finite())
        .collect();
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

/// Sum of a metric over a row subset, with the same null-sentinel rule as
/// [mean].
pub fn sum<F>(rows: &[&CanonicalRow], field: F) -> Option<f64>
where
    F: Fn(&CanonicalRow) -> Option<f64>,
{
    let vals: Vec<f64> = rows
        .iter()
        .filter_map(|r| field(r))
        .filter(|v| v.is_finite())
        .collect();
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum())
    }
}

/// Narrows a row set to the selected year. Order-preserving; the all-years
/// sentinel passes everything through.
pub fn filter_year<'a>(rows: &'a [CanonicalRow], selection: YearSelection) -> Vec<&'a CanonicalRow> {
    match selection {
        YearSelection::All => rows.iter().collect(),
        YearSelection::Year(y) => rows.iter().filter(|r| r.year == y).collect(),
    }
}

fn year_means(year: i32, rows: &[&CanonicalRow]) -> YearMeans {
    YearMeans {
        year,
        weaning_pct: mean(rows, |r| r.weaning_pct),
        marking_pct: mean(rows, |r| r.marking_pct),
        bar_weight: mean(rows, |r| r.bar_weight),
    }
}

// Per-year breakdown of the mean metrics. Sparse: only years actually
// present in the subset appear, in ascending order.
fn history(rows: &[&CanonicalRow]) -> Vec<YearMeans> {
    let mut by_year: BTreeMap<i32, Vec<&CanonicalRow>> = BTreeMap::new();
    for r in rows {
        by_year.entry(r.year).or_default().push(r);
    }
    by_year
        .iter()
        .map(|(year, group)| year_means(*year, group))
        .collect()
}

/// Computes the aggregate statistics for one zone selection.
///
/// The rows are first narrowed by the year selection, then matched against
/// the zone descriptor. An empty matched subset is a valid outcome: all
/// the aggregates are `None` and the count is zero.
pub fn aggregate_zone(
    rows: &[CanonicalRow],
    zone: &ZoneDescriptor,
    selection: YearSelection,
) -> AggregateResult {
    let in_year = filter_year(rows, selection);
    let matched: Vec<&CanonicalRow> = in_year
        .into_iter()
        .filter(|r| zone.matches(r))
        .collect();
    debug!(
        "aggregate_zone: zone {:?} selection {} matched {} rows",
        zone.label(),
        selection,
        matched.len()
    );

    let history = match selection {
        YearSelection::All => Some(history(&matched)),
        YearSelection::Year(_) => None,
    };

    let res = AggregateResult {
        zone_label: zone.label().to_string(),
        year_selection: selection.to_string(),
        record_count: matched.len(),
        weaning_pct: mean(&matched, |r| r.weaning_pct),
        marking_pct: mean(&matched, |r| r.marking_pct),
        bar_weight: mean(&matched, |r| r.bar_weight),
        lamb_count: sum(&matched, |r| r.lamb_count),
        yearling_count: sum(&matched, |r| r.yearling_count),
        ewe_count: sum(&matched, |r| r.ewe_count),
        ram_count: sum(&matched, |r| r.ram_count),
        history,
        exact_match_note: matched.is_empty() && matches!(zone, ZoneDescriptor::Name { .. }),
    };
    info!(
        "aggregate_zone: zone {:?}: {} records, weaning mean {:?}",
        res.zone_label, res.record_count, res.weaning_pct
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString, MultiPolygon, Polygon};

    fn row(year: i32, weaning: Option<f64>, lambs: Option<f64>) -> CanonicalRow {
        CanonicalRow {
            row_ordinal: 2,
            ranch_id: "E-1".to_string(),
            zone_key: ZoneKey::Coordinates {
                lat: -53.0,
                lon: -70.9,
            },
            year,
            weaning_pct: weaning,
            marking_pct: None,
            bar_weight: None,
            lamb_count: lambs,
            yearling_count: None,
            ewe_count: None,
            ram_count: None,
        }
    }

    // A polygon around the Magallanes test point used by the row fixtures.
    fn magallanes_zone() -> ZoneDescriptor {
        let ring: LineString<f64> = [
            (-72.0, -54.0),
            (-70.0, -54.0),
            (-70.0, -52.0),
            (-72.0, -52.0),
            (-72.0, -54.0),
        ]
        .iter()
        .map(|(x, y)| Coord { x: *x, y: *y })
        .collect();
        ZoneDescriptor::Polygon {
            label: "Magallanes".to_string(),
            geometry: MultiPolygon(vec![Polygon::new(ring, vec![])]),
        }
    }

    #[test]
    fn mean_and_sum_of_empty_or_all_null_are_null() {
        let rows: Vec<CanonicalRow> = vec![];
        let refs: Vec<&CanonicalRow> = rows.iter().collect();
        assert_eq!(mean(&refs, |r| r.weaning_pct), None);
        assert_eq!(sum(&refs, |r| r.lamb_count), None);

        let rows = vec![row(2021, None, None), row(2021, None, None)];
        let refs: Vec<&CanonicalRow> = rows.iter().collect();
        assert_eq!(mean(&refs, |r| r.weaning_pct), None);
        assert_eq!(sum(&refs, |r| r.lamb_count), None);
    }

    #[test]
    fn year_filter_preserves_order() {
        let rows = vec![
            row(2021, Some(1.0), None),
            row(2020, Some(2.0), None),
            row(2021, Some(3.0), None),
        ];
        let all = filter_year(&rows, YearSelection::All);
        assert_eq!(all.len(), 3);
        let y2021 = filter_year(&rows, YearSelection::Year(2021));
        assert_eq!(y2021.len(), 2);
        assert_eq!(y2021[0].weaning_pct, Some(1.0));
        assert_eq!(y2021[1].weaning_pct, Some(3.0));
    }

    #[test]
    fn history_is_sparse_and_ascending() {
        let rows = vec![
            row(2022, Some(60.0), None),
            row(2020, Some(80.0), None),
            row(2022, Some(70.0), None),
        ];
        let res = aggregate_zone(&rows, &magallanes_zone(), YearSelection::All);
        let hist = res.history.unwrap();
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].year, 2020);
        assert_eq!(hist[0].weaning_pct, Some(80.0));
        assert_eq!(hist[1].year, 2022);
        assert_eq!(hist[1].weaning_pct, Some(65.0));
    }

    #[test]
    fn scenario_all_years_in_zone() {
        let _ = env_logger::builder().is_test(true).try_init();
        let rows = vec![
            row(2021, Some(80.0), Some(100.0)),
            row(2021, Some(60.0), Some(50.0)),
        ];
        let res = aggregate_zone(&rows, &magallanes_zone(), YearSelection::All);
        assert_eq!(res.record_count, 2);
        assert_eq!(res.weaning_pct, Some(70.0));
        assert_eq!(res.lamb_count, Some(150.0));
        let hist = res.history.unwrap();
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].year, 2021);
        assert_eq!(hist[0].weaning_pct, Some(70.0));
        assert!(!res.exact_match_note);
    }

    #[test]
    fn scenario_year_without_rows_yields_empty_result() {
        let rows = vec![
            row(2021, Some(80.0), Some(100.0)),
            row(2021, Some(60.0), Some(50.0)),
        ];
        let res = aggregate_zone(&rows, &magallanes_zone(), YearSelection::Year(2020));
        assert_eq!(res.record_count, 0);
        assert_eq!(res.weaning_pct, None);
        assert_eq!(res.lamb_count, None);
        assert_eq!(res.history, None);
    }

    #[test]
    fn scenario_name_mode_exact_matching() {
        let mk = |name: &str| CanonicalRow {
            zone_key: ZoneKey::Commune(name.to_string()),
            ..row(2021, Some(50.0), None)
        };
        let rows = vec![
            mk("Punta Arenas"),
            mk("punta arenas "),
            mk("Puerto Natales"),
        ];
        let zone = ZoneDescriptor::Name {
            label: "Punta Arenas".to_string(),
        };
        let res = aggregate_zone(&rows, &zone, YearSelection::All);
        assert_eq!(res.record_count, 2);

        let natales = ZoneDescriptor::Name {
            label: "Natales".to_string(),
        };
        let res = aggregate_zone(&rows, &natales, YearSelection::All);
        assert_eq!(res.record_count, 0);
        assert!(res.exact_match_note);
    }

    #[test]
    fn rows_with_null_metrics_still_count() {
        let rows = vec![row(2021, Some(80.0), None), row(2021, None, None)];
        let res = aggregate_zone(&rows, &magallanes_zone(), YearSelection::Year(2021));
        assert_eq!(res.record_count, 2);
        // Only one row contributed to the mean.
        assert_eq!(res.weaning_pct, Some(80.0));
    }
}
