use chrono::{NaiveDate, NaiveDateTime};

/// Separator between the date and the time of day in activity date text,
/// e.g. `Fri Mar 15 2024 - 7:30 AM`
const DATE_TIME_SEPARATOR: &str = " - ";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M %p",
];

// %a/%b only match three-letter names; %A/%B take full names as well
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%a %b %d %Y",
    "%a, %b %d, %Y",
    "%a %b %d, %Y",
    "%A %B %d %Y",
    "%A, %B %d, %Y",
    "%A %B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
];

/// Parse the leading number of `text`, ignoring whatever follows it.
/// Returns 0.0 when there is no leading number at all.
pub fn parse_leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            end = frac_end;
            has_digits = true;
        }
    }

    if !has_digits {
        return 0.0;
    }

    // Optional exponent, only when digits follow it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}

/// Parse the date portion of an activity's date text.
///
/// Whitespace runs (including the newlines left by page markup) count as a
/// single space. The whole text is tried first so ISO dates survive; after
/// that, whatever precedes the first ` - `, then the first bare `-`, then the
/// first word. Plain dates resolve to midnight.
pub fn parse_start_date(text: &str) -> Option<NaiveDateTime> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    let candidates = [
        Some(normalized.as_str()),
        normalized.split_once(DATE_TIME_SEPARATOR).map(|(date, _)| date),
        normalized.split_once('-').map(|(date, _)| date),
        normalized.split(' ').next(),
    ];

    let parsed = candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .find_map(parse_date_exact);
    parsed
}

fn parse_date_exact(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
