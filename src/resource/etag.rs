//! Entity tags.

use std::fmt;

/// An opaque validator. Only equality of the opaque value is ever checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag {
    value: String,
    weak: bool,
}

impl ETag {
    pub fn strong(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            weak: false,
        }
    }

    pub fn weak(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            weak: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// Parse one entity tag, tolerating a missing pair of quotes.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (weak, rest) = match raw.strip_prefix("W/") {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let value = rest
            .strip_prefix('"')
            .and_then(|r| r.strip_suffix('"'))
            .unwrap_or(rest);
        if value.is_empty() {
            return None;
        }
        Some(Self {
            value: value.to_string(),
            weak,
        })
    }

    /// Parse an `If-Match` / `If-None-Match` list.
    pub fn parse_list(header: &str) -> Vec<Self> {
        split_list(header).into_iter().filter_map(Self::parse).collect()
    }

    /// Equality of the opaque value, ignoring weakness.
    pub fn matches(&self, other: &ETag) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.value)
        } else {
            write!(f, "\"{}\"", self.value)
        }
    }
}

/// Split a list-valued header on commas outside quoted strings.
pub fn split_list(header: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, b) in header.bytes().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b',' if !quoted => {
                items.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&header[start..]);
    items
}

/// Whether any element of a conditional header is the `*` wildcard.
pub fn is_any(header: &str) -> bool {
    split_list(header).iter().any(|item| item.trim() == "*")
}
