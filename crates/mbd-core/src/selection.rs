//! Operator index selection in range syntax (`"1-3,5"`).

use std::collections::BTreeSet;

/// Parses a comma-separated list of 1-based indices and inclusive ranges,
/// keeping only indices in `1..=max`.
///
/// Whitespace is ignored, reversed ranges (`5-3`) are normalised, and tokens
/// that are not numbers are skipped. An empty string selects nothing.
pub fn parse_ranges(input: &str, max: usize) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((a, b)) => {
                let (Ok(a), Ok(b)) = (a.trim().parse::<usize>(), b.trim().parse::<usize>()) else {
                    tracing::debug!(token = part, "ignoring malformed range");
                    continue;
                };
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                out.extend(lo.max(1)..=hi.min(max));
            }
            None => match part.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => {
                    out.insert(n);
                }
                Ok(_) => tracing::debug!(token = part, max, "index out of range"),
                Err(_) => tracing::debug!(token = part, "ignoring malformed index"),
            },
        }
    }
    out
}
