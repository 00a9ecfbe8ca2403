//! Language tags and `Accept-Language` negotiation (RFC 2616 §14.4).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::negotiation::weighted::{sort_by_quality, WeightedValue};

/// `primary-tag *( "-" subtag )`, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct LanguageTag {
    tag: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid language tag: {0:?}")]
pub struct InvalidLanguageTag(pub String);

impl LanguageTag {
    pub fn as_str(&self) -> &str {
        &self.tag
    }

    pub fn primary(&self) -> &str {
        self.tag.split('-').next().unwrap_or_default()
    }

    /// Prefix match at a subtag boundary; `*` matches every tag.
    pub fn matched_by(&self, range: &str) -> bool {
        let range = range.trim();
        if range == "*" {
            return true;
        }
        if self.tag.eq_ignore_ascii_case(range) {
            return true;
        }
        self.tag.len() > range.len()
            && self.tag.as_bytes()[range.len()] == b'-'
            && self.tag[..range.len()].eq_ignore_ascii_case(range)
    }
}

impl FromStr for LanguageTag {
    type Err = InvalidLanguageTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let valid = !tag.is_empty()
            && tag.split('-').all(|part| {
                (1..=8).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_alphanumeric())
            })
            && tag
                .split('-')
                .next()
                .is_some_and(|p| p.bytes().all(|b| b.is_ascii_alphabetic()));
        if valid {
            Ok(Self { tag: tag.to_string() })
        } else {
            Err(InvalidLanguageTag(s.to_string()))
        }
    }
}

impl PartialEq for LanguageTag {
    fn eq(&self, other: &Self) -> bool {
        self.tag.eq_ignore_ascii_case(&other.tag)
    }
}

impl Eq for LanguageTag {}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageNegotiator;

impl LanguageNegotiator {
    pub fn new() -> Self {
        Self
    }

    /// Walk the ranges by descending quality and return the first available
    /// tag the range matches. Available tags are tried in the given order.
    pub fn select(
        &self,
        available: &[LanguageTag],
        preferences: &[WeightedValue],
    ) -> Option<LanguageTag> {
        let mut ranked = preferences.to_vec();
        sort_by_quality(&mut ranked);

        ranked
            .iter()
            .filter(|range| range.is_acceptable())
            .find_map(|range| available.iter().find(|tag| tag.matched_by(range.token())))
            .cloned()
    }
}
