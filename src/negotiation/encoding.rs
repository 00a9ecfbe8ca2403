//! `Accept-Encoding` negotiation (RFC 2616 §14.3).

use crate::negotiation::weighted::{sort_by_quality, WeightedValue};

pub const IDENTITY: &str = "identity";

#[derive(Debug, Default, Clone, Copy)]
pub struct EncodingNegotiator;

impl EncodingNegotiator {
    pub fn new() -> Self {
        Self
    }

    /// Select a content-coding.
    ///
    /// `identity` is always supported and `*` never is. Returns `None` when the
    /// client refused every supported coding, identity included.
    pub fn select(
        &self,
        provided: &[String],
        preferences: Option<&[WeightedValue]>,
    ) -> Option<String> {
        let Some(preferences) = preferences else {
            return Some(IDENTITY.to_string());
        };

        let mut supported: Vec<&str> = provided
            .iter()
            .map(String::as_str)
            .filter(|e| *e != "*")
            .collect();
        if !supported.iter().any(|e| e.eq_ignore_ascii_case(IDENTITY)) {
            supported.push(IDENTITY);
        }

        let (mut allowed, disallowed): (Vec<WeightedValue>, Vec<WeightedValue>) = preferences
            .iter()
            .cloned()
            .partition(WeightedValue::is_acceptable);
        sort_by_quality(&mut allowed);

        let refused = |encoding: &str| disallowed.iter().any(|d| d.is(encoding));

        for preference in &allowed {
            if preference.is_wildcard() {
                if let Some(encoding) = supported.iter().copied().find(|e| !refused(e)) {
                    return Some(encoding.to_string());
                }
            } else if let Some(encoding) = supported.iter().copied().find(|e| preference.is(e)) {
                return Some(encoding.to_string());
            }
        }

        let wildcard_refused = disallowed.iter().any(WeightedValue::is_wildcard);
        let identity_allowed = allowed.iter().any(|a| a.is(IDENTITY));
        if (wildcard_refused && !identity_allowed) || refused(IDENTITY) {
            return None;
        }
        Some(IDENTITY.to_string())
    }
}
