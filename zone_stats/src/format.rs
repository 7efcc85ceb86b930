//! Display formatting for aggregate values.

/// Placeholder for a missing value. Distinct from "0": zero is data, this
/// is the absence of data.
pub const NO_DATA: &str = "—";

// Round-half-up at the given scale. Matches the rounding the presentation
// layer has always shown (floor(x + 0.5), not banker's rounding).
fn round_half_up(x: f64, scale: f64) -> f64 {
    (x * scale + 0.5).floor() / scale
}

/// Formats a mean-type value to one decimal place. A whole number is
/// printed without the trailing ".0".
pub fn fmt_mean(x: Option<f64>) -> String {
    match x {
        None => NO_DATA.to_string(),
        Some(v) => {
            let r = round_half_up(v, 10.0);
            if r == r.trunc() {
                format!("{}", r as i64)
            } else {
                format!("{:.1}", r)
            }
        }
    }
}

/// Formats a sum- or count-type value to the nearest integer.
pub fn fmt_count(x: Option<f64>) -> String {
    match x {
        None => NO_DATA.to_string(),
        Some(v) => format!("{}", (v + 0.5).floor() as i64),
    }
}

/// Escapes text for embedding in generated markup. Zone names and ranch
/// identifiers are data-supplied, so this is a security contract, not
/// cosmetics.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
