//! Quality-weighted header values.
//!
//! # Responsibilities
//! - Parse `token;q=0.8, other;q=0.2` lists into `WeightedValue`s
//! - Order values by quality, highest first
//!
//! # Design Decisions
//! - Parsing is lenient: empty or malformed segments are skipped, never fatal
//! - Equality and hashing look at the token only (case-insensitive), so a
//!   list can be probed for "was this token mentioned" regardless of weight
//! - Out-of-range qualities are clamped into [0, 1]; unparsable ones drop the entry

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A header token together with its quality value.
#[derive(Debug, Clone)]
pub struct WeightedValue {
    token: String,
    quality: f32,
}

impl WeightedValue {
    /// Create a value, clamping the quality into `[0, 1]`.
    pub fn new(token: impl Into<String>, quality: f32) -> Self {
        Self {
            token: token.into(),
            quality: quality.clamp(0.0, 1.0),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// `q=0` marks a token the client refuses outright.
    pub fn is_acceptable(&self) -> bool {
        self.quality > 0.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.token == "*"
    }

    /// Case-insensitive token comparison.
    pub fn is(&self, token: &str) -> bool {
        self.token.eq_ignore_ascii_case(token)
    }

    /// Total order by descending quality (higher quality sorts first).
    pub fn cmp_quality(&self, other: &Self) -> Ordering {
        other.quality.total_cmp(&self.quality)
    }

    /// Parse a full header value.
    ///
    /// Segments are split on `,`, parameters on `;`. Only the `q` parameter is
    /// interpreted; other parameters are ignored. A segment whose `q` cannot be
    /// parsed as a number is skipped.
    pub fn parse_list(header: &str) -> Vec<WeightedValue> {
        header.split(',').filter_map(Self::parse_one).collect()
    }

    fn parse_one(segment: &str) -> Option<WeightedValue> {
        let mut parts = segment.split(';').map(str::trim);
        let token = parts.next().filter(|t| !t.is_empty())?;

        let mut quality = 1.0f32;
        for param in parts.filter(|p| !p.is_empty()) {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("q") {
                let parsed: f32 = value.trim().parse().ok()?;
                if parsed.is_nan() {
                    return None;
                }
                quality = parsed;
            }
        }

        Some(WeightedValue::new(token, quality))
    }
}

/// Stable sort, highest quality first. Equal qualities keep header order.
pub fn sort_by_quality(values: &mut [WeightedValue]) {
    values.sort_by(WeightedValue::cmp_quality);
}

impl PartialEq for WeightedValue {
    fn eq(&self, other: &Self) -> bool {
        self.token.eq_ignore_ascii_case(&other.token)
    }
}

impl Eq for WeightedValue {}

impl Hash for WeightedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for WeightedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quality < 1.0 {
            write!(f, "{};q={}", self.token, self.quality)
        } else {
            f.write_str(&self.token)
        }
    }
}
