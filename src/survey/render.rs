// Rendering of an aggregate result as plain text and as an HTML report.

use std::fmt::Write;

use zone_stats::format::{escape_html, fmt_count, fmt_mean};
use zone_stats::AggregateResult;

const EXACT_MATCH_NOTE: &str =
    "Note: zone names are matched exactly; zero records may simply mean the \
     spreadsheet spells the zone differently.";

pub fn render_text(result: &AggregateResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Zone: {}", result.zone_label);
    let _ = writeln!(
        out,
        "Year filter: {} | Records in zone: {}",
        result.year_selection, result.record_count
    );
    if result.exact_match_note {
        let _ = writeln!(out, "{}", EXACT_MATCH_NOTE);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Means");
    let _ = writeln!(out, "  Weaning pct: {}", fmt_mean(result.weaning_pct));
    let _ = writeln!(out, "  Marking pct: {}", fmt_mean(result.marking_pct));
    let _ = writeln!(out, "  Bar weight:  {}", fmt_mean(result.bar_weight));
    let _ = writeln!(out);
    let _ = writeln!(out, "Totals per category");
    let _ = writeln!(out, "  Lambs:     {}", fmt_count(result.lamb_count));
    let _ = writeln!(out, "  Yearlings: {}", fmt_count(result.yearling_count));
    let _ = writeln!(out, "  Ewes:      {}", fmt_count(result.ewe_count));
    let _ = writeln!(out, "  Rams:      {}", fmt_count(result.ram_count));
    if let Some(history) = &result.history {
        let _ = writeln!(out);
        let _ = writeln!(out, "History (means per year)");
        let _ = writeln!(out, "  year | weaning | marking | bar weight");
        for h in history {
            let _ = writeln!(
                out,
                "  {} | {} | {} | {}",
                h.year,
                fmt_mean(h.weaning_pct),
                fmt_mean(h.marking_pct),
                fmt_mean(h.bar_weight)
            );
        }
    }
    out
}

/// Builds the benchmark report as a standalone HTML fragment. All the
/// data-supplied text goes through [escape_html].
pub fn render_html(result: &AggregateResult) -> String {
    let mut hist_html = String::new();
    if let Some(history) = &result.history {
        let mut rows = String::new();
        for h in history {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                h.year,
                fmt_mean(h.weaning_pct),
                fmt_mean(h.marking_pct),
                fmt_mean(h.bar_weight)
            );
        }
        hist_html = format!(
            "<h3>History (means)</h3>\
             <table>\
             <thead><tr><th>Year</th><th>Weaning %</th><th>Marking %</th><th>Bar weight</th></tr></thead>\
             <tbody>{}</tbody>\
             </table>",
            rows
        );
    }

    let note_html = if result.exact_match_note {
        format!("<div class=\"small\">{}</div>", EXACT_MATCH_NOTE)
    } else {
        String::new()
    };

    format!(
        "<div class=\"small\">Selected zone:</div>\
         <h2>{zone}</h2>\
         <div class=\"small\">Year filter: <b>{year}</b> | Records in zone: <b>{count}</b></div>\
         {note}\
         <h3>Means</h3>\
         <table><tbody>\
         <tr><td>Weaning %</td><td><b>{weaning}</b></td></tr>\
         <tr><td>Marking %</td><td><b>{marking}</b></td></tr>\
         <tr><td>Bar weight</td><td><b>{bar}</b></td></tr>\
         </tbody></table>\
         <h3>Totals per category</h3>\
         <table><tbody>\
         <tr><td>Lambs</td><td><b>{lambs}</b></td></tr>\
         <tr><td>Yearlings</td><td><b>{yearlings}</b></td></tr>\
         <tr><td>Ewes</td><td><b>{ewes}</b></td></tr>\
         <tr><td>Rams</td><td><b>{rams}</b></td></tr>\
         </tbody></table>\
         {hist}",
        zone = escape_html(&result.zone_label),
        year = escape_html(&result.year_selection),
        count = result.record_count,
        note = note_html,
        weaning = fmt_mean(result.weaning_pct),
        marking = fmt_mean(result.marking_pct),
        bar = fmt_mean(result.bar_weight),
        lambs = fmt_count(result.lamb_count),
        yearlings = fmt_count(result.yearling_count),
        ewes = fmt_count(result.ewe_count),
        rams = fmt_count(result.ram_count),
        hist = hist_html
    )
}
