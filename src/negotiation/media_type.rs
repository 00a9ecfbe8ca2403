//! Media types and `Accept` negotiation.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::negotiation::weighted::WeightedValue;

/// A `type/subtype` pair. Either half may be the `*` wildcard.
///
/// Both halves are stored lowercase, so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    kind: String,
    subtype: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid media type: {0:?}")]
pub struct InvalidMediaType(pub String);

impl MediaType {
    pub fn new(kind: &str, subtype: &str) -> Self {
        Self {
            kind: kind.trim().to_ascii_lowercase(),
            subtype: subtype.trim().to_ascii_lowercase(),
        }
    }

    pub fn any() -> Self {
        Self::new("*", "*")
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn is_wildcard(&self) -> bool {
        self.kind == "*" || self.subtype == "*"
    }

    /// Whether `self` (normally concrete) satisfies `pattern`.
    pub fn matches(&self, pattern: &MediaType) -> bool {
        (pattern.kind == "*" || pattern.kind == self.kind)
            && (pattern.subtype == "*" || pattern.subtype == self.subtype)
    }

    fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    /// `text/html` precedes `text/*`, which precedes `*/*`.
    pub fn precedes(&self, other: &MediaType) -> bool {
        self.specificity() > other.specificity()
    }
}

impl FromStr for MediaType {
    type Err = InvalidMediaType;

    /// Parses `type/subtype`, ignoring any `;` parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.split_once('/') {
            Some((kind, subtype))
                if !kind.trim().is_empty()
                    && !subtype.trim().is_empty()
                    && !subtype.contains('/') =>
            {
                Ok(MediaType::new(kind, subtype))
            }
            _ => Err(InvalidMediaType(s.to_string())),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

/// Picks the provided media type the client ranks best.
#[derive(Debug, Default, Clone, Copy)]
pub struct MediaTypeNegotiator;

impl MediaTypeNegotiator {
    pub fn new() -> Self {
        Self
    }

    /// Each provided type is weighted by the most specific `Accept` range it
    /// matches. The winner has the highest weight; ties go to the type matched
    /// by the more specific range, then to declaration order.
    ///
    /// Without preferences (no `Accept` header) the first provided type wins.
    pub fn select(
        &self,
        provided: &[MediaType],
        preferences: Option<&[WeightedValue]>,
    ) -> Option<MediaType> {
        let Some(preferences) = preferences else {
            return provided.first().cloned();
        };

        let ranges: Vec<(MediaType, f32)> = preferences
            .iter()
            .filter_map(|p| {
                let range = if p.is_wildcard() {
                    MediaType::any()
                } else {
                    p.token().parse().ok()?
                };
                Some((range, p.quality()))
            })
            .collect();

        let mut best: Option<(&MediaType, f32, u8)> = None;
        for candidate in provided {
            let mut matched: Option<(&MediaType, f32)> = None;
            for (range, quality) in &ranges {
                if !candidate.matches(range) {
                    continue;
                }
                match matched {
                    Some((current, _)) if !range.precedes(current) => {}
                    _ => matched = Some((range, *quality)),
                }
            }

            let Some((range, quality)) = matched else {
                continue;
            };
            if quality <= 0.0 {
                continue;
            }

            let specificity = range.specificity();
            let better = match best {
                None => true,
                Some((_, q, s)) => quality > q || (quality == q && specificity > s),
            };
            if better {
                best = Some((candidate, quality, specificity));
            }
        }

        best.map(|(media_type, _, _)| media_type.clone())
    }
}
