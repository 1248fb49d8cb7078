//! Recognises the progress markers in the media tool's combined output.

/// One decoded marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// `Duration: H:MM:SS.ff`; `None` for `Duration: N/A`.
    Duration(Option<f64>),
    /// `time=H:MM:SS.ff` (also matches `out_time=` from `-progress`).
    Time(f64),
}

/// Decodes a single output line; unrecognised lines yield `None`.
pub fn parse_line(line: &str) -> Option<ProgressEvent> {
    if let Some((_, rest)) = line.split_once("Duration:") {
        let value = rest.split(',').next().unwrap_or("").trim();
        if value.starts_with("N/A") {
            return Some(ProgressEvent::Duration(None));
        }
        return parse_clock(value).map(|secs| ProgressEvent::Duration(Some(secs)));
    }
    if let Some((_, rest)) = line.split_once("time=") {
        let value = rest.split_whitespace().next().unwrap_or("");
        return parse_clock(value).map(ProgressEvent::Time);
    }
    None
}

/// Parses `H:MM:SS` with optional fractional seconds into seconds.
/// Negative or malformed clocks yield `None`.
pub fn parse_clock(s: &str) -> Option<f64> {
    let mut parts = s.trim().split(':');
    let (h, m, sec) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || h.starts_with('-') {
        return None;
    }
    let hours: f64 = h.parse().ok()?;
    let minutes: f64 = m.parse().ok()?;
    let seconds: f64 = sec.parse().ok()?;
    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    (total.is_finite() && total >= 0.0).then_some(total)
}
