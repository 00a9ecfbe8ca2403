//! HTTP date formatting and parsing.
//!
//! Dates are always emitted in the RFC 1123 form
//! (`Sun, 06 Nov 1994 08:49:37 GMT`). Parsing also accepts the obsolete
//! RFC 850 and asctime forms, as HTTP/1.1 recipients must.

use chrono::{DateTime, NaiveDateTime, Utc};

const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format a timestamp as an HTTP date.
pub fn format_http_date(date: &DateTime<Utc>) -> String {
    date.format(RFC1123).to_string()
}

/// Parse an HTTP date. Returns `None` for anything syntactically invalid.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [RFC1123, RFC850, ASCTIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Drop sub-second precision; HTTP dates only carry whole seconds.
pub fn truncate_to_seconds(date: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(date.timestamp(), 0).unwrap_or(date)
}
