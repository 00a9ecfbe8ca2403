//! Byte ranges.
//!
//! # Data Flow
//! ```text
//! Range: bytes=0-99,200-,-50
//!     → Range::parse (lenient, whole header dropped on a malformed spec)
//!     → Range::collapse(len) (drop unsatisfiable, merge overlaps)
//!     → one range:   206 + Content-Range + slice
//!       many ranges: 206 + multipart/byteranges (byteranges.rs)
//!       none:        416 + Content-Range: bytes */len
//! ```
//!
//! # Design Decisions
//! - Pure functions over a known representation length; nothing here
//!   touches a request or response
//! - `collapse` expects ranges in ascending order and does not sort them

pub mod byteranges;

use std::fmt;

pub use byteranges::{boundary, write_multipart};

/// One `first-last`, `first-` or `-suffix` byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    from: Option<u64>,
    to: Option<u64>,
}

impl Range {
    /// `None` when both bounds are missing.
    pub fn new(from: Option<u64>, to: Option<u64>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            None
        } else {
            Some(Self { from, to })
        }
    }

    /// Bytes `first..=last`.
    pub fn bounded(first: u64, last: u64) -> Self {
        Self {
            from: Some(first),
            to: Some(last),
        }
    }

    pub fn from(&self) -> Option<u64> {
        self.from
    }

    pub fn to(&self) -> Option<u64> {
        self.to
    }

    /// Parse a `Range` header value.
    ///
    /// Anything but the `bytes` unit, or any spec that is not
    /// `digits-digits`, discards the whole list. Specs whose numbers do not
    /// fit are skipped.
    pub fn parse(header: &str) -> Vec<Range> {
        let Some((unit, specs)) = header.trim().split_once('=') else {
            return Vec::new();
        };
        if !unit.trim().eq_ignore_ascii_case("bytes") {
            return Vec::new();
        }

        let mut ranges = Vec::new();
        for spec in specs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((first, last)) = spec.split_once('-') else {
                return Vec::new();
            };
            let (first, last) = (first.trim(), last.trim());
            if !first.bytes().all(|b| b.is_ascii_digit())
                || !last.bytes().all(|b| b.is_ascii_digit())
            {
                return Vec::new();
            }

            let from = match first {
                "" => None,
                digits => match digits.parse() {
                    Ok(n) => Some(n),
                    Err(_) => continue,
                },
            };
            let to = match last {
                "" => None,
                digits => match digits.parse() {
                    Ok(n) => Some(n),
                    Err(_) => continue,
                },
            };
            if let Some(range) = Range::new(from, to) {
                ranges.push(range);
            }
        }
        ranges
    }

    /// Syntactic validity: `first <= last` when both are present.
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            (None, None) => false,
            _ => true,
        }
    }

    /// Whether at least one byte of a representation of `len` bytes is selected.
    pub fn is_satisfiable(&self, len: u64) -> bool {
        if !self.is_valid() || len == 0 {
            return false;
        }
        match (self.from, self.to) {
            (Some(from), _) => from < len,
            (None, Some(suffix)) => suffix > 0,
            (None, None) => false,
        }
    }

    /// First selected byte. Only meaningful when satisfiable.
    pub fn first_byte(&self, len: u64) -> u64 {
        match (self.from, self.to) {
            (Some(from), _) => from,
            (None, Some(suffix)) => len.saturating_sub(suffix),
            (None, None) => 0,
        }
    }

    /// Last selected byte, clamped to the representation. Only meaningful
    /// when satisfiable.
    pub fn last_byte(&self, len: u64) -> u64 {
        let end = len.saturating_sub(1);
        match (self.from, self.to) {
            (Some(_), Some(to)) => to.min(end),
            _ => end,
        }
    }

    pub fn size(&self, len: u64) -> u64 {
        self.last_byte(len) - self.first_byte(len) + 1
    }

    /// `bytes first-last/len`
    pub fn content_range(&self, len: u64) -> String {
        format!("bytes {}-{}/{}", self.first_byte(len), self.last_byte(len), len)
    }

    /// Resolve, drop unsatisfiable ranges, and merge overlapping or adjacent
    /// ones. Input must be in ascending order of first byte.
    pub fn collapse(ranges: &[Range], len: u64) -> Vec<Range> {
        let mut collapsed: Vec<Range> = Vec::with_capacity(ranges.len());
        for range in ranges.iter().filter(|r| r.is_satisfiable(len)) {
            let (first, last) = (range.first_byte(len), range.last_byte(len));
            match collapsed.last_mut() {
                Some(prev) if first <= prev.last_byte(len).saturating_add(1) => {
                    let merged_last = last.max(prev.last_byte(len));
                    *prev = Range::bounded(prev.first_byte(len), merged_last);
                }
                _ => collapsed.push(Range::bounded(first, last)),
            }
        }
        collapsed
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(from) = self.from {
            write!(f, "{from}")?;
        }
        f.write_str("-")?;
        if let Some(to) = self.to {
            write!(f, "{to}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        let ranges = Range::parse("bytes=0-99, 200-, -50");
        assert_eq!(
            ranges,
            vec![
                Range::bounded(0, 99),
                Range::new(Some(200), None).unwrap(),
                Range::new(None, Some(50)).unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_whole_list() {
        assert!(Range::parse("items=0-5").is_empty());
        assert!(Range::parse("bytes=0-5,abc").is_empty());
        assert!(Range::parse("bytes=0-5,1-2-3").is_empty());
        assert!(Range::parse("0-5").is_empty());
    }

    #[test]
    fn test_parse_skips_bad_numbers() {
        let ranges = Range::parse("bytes=0-1,99999999999999999999999-,-,5-6");
        assert_eq!(ranges, vec![Range::bounded(0, 1), Range::bounded(5, 6)]);
    }

    #[test]
    fn test_open_ended_resolution() {
        let suffix = Range::new(None, Some(4)).unwrap();
        assert_eq!(suffix.first_byte(10), 6);
        assert_eq!(suffix.last_byte(10), 9);
        assert_eq!(suffix.size(10), 4);

        let long_suffix = Range::new(None, Some(40)).unwrap();
        assert_eq!(long_suffix.first_byte(10), 0);
        assert_eq!(long_suffix.size(10), 10);

        let prefix = Range::new(Some(3), None).unwrap();
        assert_eq!(prefix.last_byte(10), 9);
        assert_eq!(prefix.size(10), 7);

        assert_eq!(Range::bounded(8, 100).last_byte(10), 9);
    }

    #[test]
    fn test_validity_and_satisfiability() {
        assert!(!Range::bounded(5, 4).is_valid());
        assert!(!Range::bounded(5, 4).is_satisfiable(100));
        assert!(!Range::bounded(10, 20).is_satisfiable(10));
        assert!(Range::bounded(9, 20).is_satisfiable(10));
        assert!(!Range::new(None, Some(0)).unwrap().is_satisfiable(10));
        assert!(!Range::bounded(0, 0).is_satisfiable(0));
    }

    #[test]
    fn test_collapse_merges_and_drops() {
        let ranges = [
            Range::bounded(0, 4),
            Range::bounded(3, 9),
            Range::bounded(10, 12),
            Range::bounded(20, 25),
            Range::bounded(50, 60),
        ];
        assert_eq!(
            Range::collapse(&ranges, 30),
            vec![Range::bounded(0, 12), Range::bounded(20, 25)]
        );
    }

    #[test]
    fn test_content_range() {
        assert_eq!(Range::bounded(0, 99).content_range(1000), "bytes 0-99/1000");
        assert_eq!(Range::new(None, Some(10)).unwrap().content_range(100), "bytes 90-99/100");
    }
}
