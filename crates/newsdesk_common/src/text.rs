//! Text formatting helpers for display cells

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

pub const ELLIPSIS: &str = "...";

/// Cut `text` to `max_chars` characters, appending an ellipsis only when
/// something was actually removed.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Upper-case the first letter of every word. Words break at whitespace,
/// `_` and `-`; separators are kept.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace() || c == '_' || c == '-';
    }
    out
}

/// Parse a backend timestamp. RFC 3339 first, then naive ISO-8601 which
/// the backend emits for UTC columns.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a backend timestamp in `tz`. Unparseable input is returned as is.
pub fn format_timestamp_in<Tz>(raw: &str, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(tz).format(format).to_string(),
        None => raw.to_string(),
    }
}

/// Render a backend timestamp in the local timezone
pub fn format_timestamp(raw: &str, format: &str) -> String {
    format_timestamp_in(raw, &Local, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FMT: &str = "%Y-%m-%d %H:%M:%S";

    #[test]
    fn test_truncate_longer_than_limit() {
        let title = "a".repeat(41);
        let short = truncate_with_ellipsis(&title, 40);
        assert_eq!(short, format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn test_truncate_exact_and_shorter() {
        let exact = "b".repeat(40);
        assert_eq!(truncate_with_ellipsis(&exact, 40), exact);
        assert_eq!(truncate_with_ellipsis("short", 40), "short");
        assert_eq!(truncate_with_ellipsis("", 40), "");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let title = "Próxima Execução".repeat(3);
        let short = truncate_with_ellipsis(&title, 10);
        assert_eq!(short, "Próxima Ex...");
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("movies"), "Movies");
        assert_eq!(capitalize_words("tv series"), "Tv Series");
        assert_eq!(capitalize_words(""), "");
        assert_eq!(capitalize_words("tv_series"), "Tv_Series");
        assert_eq!(capitalize_words("sci-fi  shows"), "Sci-Fi  Shows");
    }

    #[test]
    fn test_format_rfc3339_in_utc() {
        let s = format_timestamp_in("2024-05-01T10:15:00-03:00", &Utc, FMT);
        assert_eq!(s, "2024-05-01 13:15:00");
    }

    #[test]
    fn test_format_naive_as_utc() {
        let s = format_timestamp_in("2024-05-01T10:15:00.123456", &Utc, FMT);
        assert_eq!(s, "2024-05-01 10:15:00");
    }

    #[test]
    fn test_format_garbage_passthrough() {
        assert_eq!(format_timestamp_in("yesterday", &Utc, FMT), "yesterday");
    }
}
